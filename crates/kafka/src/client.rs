use clap::Args;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::StreamConsumer;
use rdkafka::producer::FutureProducer;
use tracing::info;

use crate::error::{Error, Result};

/// Client id reported to the brokers by the producer.
pub const PRODUCER_CLIENT_ID: &str = "quotefeed-producer";

/// Client id reported to the brokers by the consumer.
pub const CONSUMER_CLIENT_ID: &str = "quotefeed-consumer";

/// Consumer group for the subscriber loop. Fixed on purpose: every consume
/// run resumes the same group's committed offsets.
pub const CONSUMER_GROUP_ID: &str = "quotefeed-consumer";

/// Kafka connection options shared by the produce and consume commands.
///
/// Everything can come from the environment as well as the command line, so
/// a `.env` file with `KAFKA_BOOTSTRAP_SERVERS` and `KAFKA_TOPIC` is enough
/// to configure a run.
#[derive(Args, Clone, Debug, Default)]
pub struct KafkaOpts {
    /// Comma-separated broker list; when unset the producer runs in
    /// print-only mode
    #[arg(long, env = "KAFKA_BOOTSTRAP_SERVERS")]
    pub brokers: Option<String>,

    /// Topic to publish to or consume from
    #[arg(long, env = "KAFKA_TOPIC")]
    pub topic: Option<String>,

    /// Security protocol (e.g. SASL_SSL)
    #[arg(long, env = "KAFKA_SECURITY_PROTOCOL")]
    pub security_protocol: Option<String>,

    /// SASL mechanism (e.g. SCRAM-SHA-512)
    #[arg(long, env = "KAFKA_SASL_MECHANISM")]
    pub sasl_mechanism: Option<String>,

    /// SASL username
    #[arg(long, env = "KAFKA_SASL_USERNAME")]
    pub sasl_username: Option<String>,

    /// SASL password
    #[arg(long, env = "KAFKA_SASL_PASSWORD")]
    pub sasl_password: Option<String>,
}

/// A connected producer paired with its destination topic.
///
/// `FutureProducer` is a thread-safe handle over librdkafka; clones share
/// the same underlying client, so one target can be handed to any number of
/// concurrent workers.
#[derive(Clone)]
pub struct PublishTarget {
    pub producer: FutureProducer,
    pub topic: String,
}

impl KafkaOpts {
    fn base_config(&self, brokers: &str, client_id: &str) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", brokers)
            .set("client.id", client_id);
        if let Some(protocol) = &self.security_protocol {
            config.set("security.protocol", protocol);
        }
        if let Some(mechanism) = &self.sasl_mechanism {
            config.set("sasl.mechanism", mechanism);
        }
        if let Some(username) = &self.sasl_username {
            config.set("sasl.username", username);
        }
        if let Some(password) = &self.sasl_password {
            config.set("sasl.password", password);
        }
        config
    }

    /// Create a producer, or `None` when no brokers are configured
    /// (print-only mode).
    pub fn producer(&self) -> Result<Option<FutureProducer>> {
        let Some(brokers) = &self.brokers else {
            info!("No Kafka brokers configured, running in print-only mode");
            return Ok(None);
        };
        info!("Creating Kafka producer with bootstrap servers: {brokers}");
        let producer = self
            .base_config(brokers, PRODUCER_CLIENT_ID)
            .set("message.timeout.ms", "30000")
            .create()?;
        Ok(Some(producer))
    }

    /// Resolve the producer-side target: `Some` when brokers are configured,
    /// `None` for print-only mode. Configured brokers without a topic are a
    /// configuration error.
    pub fn publish_target(&self) -> Result<Option<PublishTarget>> {
        let Some(producer) = self.producer()? else {
            return Ok(None);
        };
        let topic = self.topic.clone().ok_or(Error::MissingTopic)?;
        Ok(Some(PublishTarget { producer, topic }))
    }

    /// Create a consumer in the fixed quotefeed group. Offsets are committed
    /// manually by the subscriber loop, one message at a time, so a restart
    /// resumes at the first unprocessed message.
    pub fn consumer(&self) -> Result<StreamConsumer> {
        let brokers = self.brokers.as_deref().ok_or(Error::MissingBrokers)?;
        info!("Creating Kafka consumer with bootstrap servers: {brokers}");
        let consumer = self
            .base_config(brokers, CONSUMER_CLIENT_ID)
            .set("group.id", CONSUMER_GROUP_ID)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "true")
            .create()?;
        Ok(consumer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        kafka: KafkaOpts,
    }

    #[test]
    fn producer_is_none_without_brokers() {
        let opts = KafkaOpts::default();
        assert!(opts.producer().unwrap().is_none());
        assert!(opts.publish_target().unwrap().is_none());
    }

    #[test]
    fn publish_target_requires_topic() {
        // Client creation is lazy, no broker connection happens here.
        let opts = KafkaOpts {
            brokers: Some("localhost:9092".to_string()),
            ..KafkaOpts::default()
        };
        assert!(matches!(opts.publish_target(), Err(Error::MissingTopic)));
    }

    #[test]
    fn publish_target_pairs_producer_and_topic() {
        let opts = KafkaOpts {
            brokers: Some("localhost:9092".to_string()),
            topic: Some("historical-quotes".to_string()),
            ..KafkaOpts::default()
        };
        let target = opts.publish_target().unwrap().unwrap();
        assert_eq!(target.topic, "historical-quotes");
    }

    #[test]
    fn consumer_requires_brokers() {
        let opts = KafkaOpts::default();
        assert!(matches!(opts.consumer(), Err(Error::MissingBrokers)));
    }

    #[test]
    fn opts_parse_from_flags() {
        let cli = TestCli::parse_from([
            "test",
            "--brokers",
            "broker-1:9092,broker-2:9092",
            "--topic",
            "historical-quotes",
            "--security-protocol",
            "SASL_SSL",
        ]);
        assert_eq!(
            cli.kafka.brokers.as_deref(),
            Some("broker-1:9092,broker-2:9092")
        );
        assert_eq!(cli.kafka.topic.as_deref(), Some("historical-quotes"));
        assert_eq!(cli.kafka.security_protocol.as_deref(), Some("SASL_SSL"));
    }
}
