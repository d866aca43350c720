use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No Avro schema file (.avsc) found in {}", .0.display())]
    NoSchemaFound(PathBuf),

    #[error("Malformed Avro schema {}: {reason}", .path.display())]
    MalformedSchema { path: PathBuf, reason: String },

    #[error("Invalid {field} value {value:?}")]
    InvalidNumericField { field: &'static str, value: String },

    #[error("Record does not conform to schema {schema}")]
    SchemaValidation { schema: String },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
