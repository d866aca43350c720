use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{} is not a CSV file or directory", .0.display())]
    InvalidInputPath(PathBuf),

    #[error("No CSV files found in directory {}", .0.display())]
    NoCsvFiles(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Record error: {0}")]
    Record(#[from] quote_core::Error),

    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
