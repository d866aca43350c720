//! CSV source for quotefeed: discovers per-instrument quote CSV files and
//! publishes every row to Kafka, keyed by instrument symbol.
//!
//! ```text
//! discover_csv_files        QuotePublisher            per file
//! path -> [a_AAPL.csv,  ->  bounded worker pool  ->   rows -> transform
//!          b_MSFT.csv]      (shared producer)         -> encode -> send
//! ```
//!
//! One worker owns one file. Workers run concurrently up to a configurable
//! cap, share a single producer handle, and the dispatcher waits for all of
//! them before one final flush. Without configured brokers the same
//! pipeline runs in print-only mode: records are transformed and logged,
//! nothing is published.

pub mod discover;
pub mod dispatch;
pub mod error;
pub mod worker;

// Re-exports for convenience
pub use discover::discover_csv_files;
pub use dispatch::{DispatchSummary, QuotePublisher, DEFAULT_MAX_WORKERS};
pub use error::{Error, Result};
pub use worker::{publish_file, FileSummary, DEFAULT_BATCH_SIZE};
