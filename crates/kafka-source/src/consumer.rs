//! The subscriber loop.
//!
//! One logical consumer: subscribe to the topic, poll with a fixed timeout,
//! decode each message, hand it to the caller, and commit its offset. The
//! loop runs until a broker-level error, the optional message limit, or a
//! shutdown signal ends it.
//!
//! Offsets are committed one message at a time, after the message has been
//! decoded and reported (or logged as skipped), so an interrupted run
//! resumes at the first unprocessed message rather than wherever an
//! auto-commit timer last fired.

use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use quote_core::QuoteCodec;
use quotefeed_kafka::KafkaOpts;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::{BorrowedMessage, Message};
use rdkafka::{Offset, TopicPartitionList};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// How long one poll blocks waiting for a message.
const POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Consumer loop configuration.
#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Kafka connection options
    #[clap(flatten)]
    pub kafka: KafkaOpts,

    /// Stop after this many successfully decoded messages
    #[clap(long)]
    pub limit: Option<u64>,
}

/// One decoded message, as reported to the caller.
#[derive(Debug, Clone)]
pub struct DecodedQuote {
    /// 1-based position in this run's sequence of decoded messages.
    pub index: u64,
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Partition key, lossily decoded as UTF-8.
    pub key: Option<String>,
    pub record: quote_core::QuoteRecord,
}

/// Install a Ctrl+C handler. The returned receiver fires once when the
/// operator interrupts the process.
pub fn setup_shutdown_handler() -> broadcast::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("\nReceived interrupt signal (Ctrl+C)");
        let _ = shutdown_tx.send(());
    });

    shutdown_rx
}

/// Consume from the configured topic until the limit, a shutdown signal, or
/// a broker-level error stops the loop. Every decoded message is passed to
/// `on_record`; undecodable messages are logged and skipped. Returns the
/// number of successfully decoded messages.
pub async fn run<F>(
    config: Config,
    codec: QuoteCodec,
    mut shutdown: broadcast::Receiver<()>,
    mut on_record: F,
) -> anyhow::Result<u64>
where
    F: FnMut(&DecodedQuote),
{
    let topic = config
        .kafka
        .topic
        .clone()
        .ok_or(quotefeed_kafka::Error::MissingTopic)?;
    let consumer = config.kafka.consumer()?;
    consumer
        .subscribe(&[topic.as_str()])
        .context("Failed to subscribe to topic")?;
    info!("Subscribed to topic: {topic}");
    match config.limit {
        Some(limit) => info!("Will consume up to {limit} message(s)"),
        None => info!("Consuming until interrupted (Ctrl+C to stop)"),
    }

    let mut consumed: u64 = 0;
    let mut terminal: Option<KafkaError> = None;

    loop {
        if let Some(limit) = config.limit {
            if consumed >= limit {
                info!("Reached message limit of {limit}");
                break;
            }
        }

        tokio::select! {
            _ = shutdown.recv() => {
                info!("Received shutdown signal");
                break;
            }
            polled = tokio::time::timeout(POLL_TIMEOUT, consumer.recv()) => {
                // Poll timeout with nothing available, go around again.
                let Ok(result) = polled else {
                    continue;
                };
                match result {
                    Err(KafkaError::PartitionEOF(partition)) => {
                        info!("Reached end of partition {partition}");
                    }
                    Err(e) => {
                        error!("Consumer error: {e}");
                        terminal = Some(e);
                        break;
                    }
                    Ok(message) => {
                        match decode_message(&codec, &message, consumed + 1) {
                            Ok(quote) => {
                                consumed += 1;
                                on_record(&quote);
                            }
                            Err(e) => warn!(
                                "Skipping undecodable message at {} [{}] offset {}: {e}",
                                message.topic(),
                                message.partition(),
                                message.offset()
                            ),
                        }
                        // Decoded or skipped, the message is dealt with
                        // either way; move the group past it.
                        if let Err(e) = commit_next(&consumer, &message) {
                            error!("Failed to commit offset: {e}");
                            terminal = Some(e);
                            break;
                        }
                    }
                }
            }
        }
    }

    info!("Consumed {consumed} messages total");
    if let Some(e) = terminal {
        return Err(e).context("Kafka consumer terminated");
    }
    Ok(consumed)
}

fn decode_message(
    codec: &QuoteCodec,
    message: &BorrowedMessage<'_>,
    index: u64,
) -> quote_core::Result<DecodedQuote> {
    let payload = message
        .payload()
        .ok_or_else(|| quote_core::Error::Decode("message has no payload".to_string()))?;
    let record = codec.decode(payload)?;
    let key = message.key().map(|k| String::from_utf8_lossy(k).into_owned());
    Ok(DecodedQuote {
        index,
        topic: message.topic().to_string(),
        partition: message.partition(),
        offset: message.offset(),
        key,
        record,
    })
}

fn commit_next(consumer: &StreamConsumer, message: &BorrowedMessage<'_>) -> Result<(), KafkaError> {
    let mut tpl = TopicPartitionList::new();
    tpl.add_partition_offset(
        message.topic(),
        message.partition(),
        Offset::Offset(message.offset() + 1),
    )?;
    consumer.commit(&tpl, CommitMode::Sync)
}
