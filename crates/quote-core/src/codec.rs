//! Wire codecs for quote records.
//!
//! Two encodings ship: schema-validated Avro binary (the bare datum, no
//! container header, so both ends of the topic must hold an identical
//! schema) and self-describing JSON. Either way,
//! `decode(encode(r))` returns `r` unchanged for every valid record.

use apache_avro::{from_avro_datum, from_value, to_avro_datum, to_value};

use crate::error::{Error, Result};
use crate::record::QuoteRecord;
use crate::schema::QuoteSchema;

/// Message encoding selected at configuration time; one instance is shared
/// read-only by every worker for the lifetime of a run.
#[derive(Debug, Clone)]
pub enum QuoteCodec {
    /// Schema-validated Avro datum encoding.
    Avro(AvroQuoteCodec),
    /// Self-describing JSON. No schema, so malformed input only surfaces
    /// at decode time.
    Json,
}

impl QuoteCodec {
    /// Avro codec bound to a loaded schema.
    pub fn avro(schema: QuoteSchema) -> QuoteCodec {
        QuoteCodec::Avro(AvroQuoteCodec { schema })
    }

    /// JSON codec.
    pub fn json() -> QuoteCodec {
        QuoteCodec::Json
    }

    pub fn encode(&self, record: &QuoteRecord) -> Result<Vec<u8>> {
        match self {
            QuoteCodec::Avro(avro) => avro.encode(record),
            QuoteCodec::Json => serde_json::to_vec(record).map_err(|e| Error::Encode(e.to_string())),
        }
    }

    pub fn decode(&self, payload: &[u8]) -> Result<QuoteRecord> {
        match self {
            QuoteCodec::Avro(avro) => avro.decode(payload),
            QuoteCodec::Json => {
                serde_json::from_slice(payload).map_err(|e| Error::Decode(e.to_string()))
            }
        }
    }
}

/// Avro datum codec. Payloads are schema-less binary, decodable only with
/// the same schema the encoder held.
#[derive(Debug, Clone)]
pub struct AvroQuoteCodec {
    schema: QuoteSchema,
}

impl AvroQuoteCodec {
    /// Check a record against the schema without encoding it.
    pub fn validate(&self, record: &QuoteRecord) -> Result<bool> {
        let value = to_value(record).map_err(|e| Error::Encode(e.to_string()))?;
        Ok(value.validate(self.schema.schema()))
    }

    /// Validate, then encode. A record the schema rejects is never encoded.
    pub fn encode(&self, record: &QuoteRecord) -> Result<Vec<u8>> {
        let value = to_value(record).map_err(|e| Error::Encode(e.to_string()))?;
        if !value.validate(self.schema.schema()) {
            return Err(Error::SchemaValidation {
                schema: self.schema.full_name(),
            });
        }
        to_avro_datum(self.schema.schema(), value).map_err(|e| Error::Encode(e.to_string()))
    }

    pub fn decode(&self, payload: &[u8]) -> Result<QuoteRecord> {
        let mut reader = payload;
        let value = from_avro_datum(self.schema.schema(), &mut reader, None)
            .map_err(|e| Error::Decode(e.to_string()))?;
        from_value::<QuoteRecord>(&value).map_err(|e| Error::Decode(e.to_string()))
    }
}
