//! Core domain types for the quotefeed pipeline: the canonical quote
//! record, the CSV row transformation, Avro schema loading, and the wire
//! codecs shared by the producer and consumer sides.

pub mod codec;
pub mod error;
pub mod record;
pub mod schema;
pub mod transform;

// Re-exports for convenience
pub use codec::{AvroQuoteCodec, QuoteCodec};
pub use error::{Error, Result};
pub use record::{QuoteRecord, SourceRow};
pub use schema::QuoteSchema;
pub use transform::{parse_volume, symbol_from_filename, transform};
