use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("No Kafka brokers configured (set --brokers or KAFKA_BOOTSTRAP_SERVERS)")]
    MissingBrokers,

    #[error("No Kafka topic configured (set --topic or KAFKA_TOPIC)")]
    MissingTopic,
}

pub type Result<T> = std::result::Result<T, Error>;
