//! Kafka plumbing shared by the quotefeed producer and consumer commands.
//!
//! Holds the connection options surface (CLI flags backed by `KAFKA_*`
//! environment variables) and the client construction that both sides use:
//!
//! - Producer: optional, absent brokers mean print-only mode
//! - Consumer: fixed group id, manual offset commits, partition EOF events
//!   enabled so the subscriber loop can report them

/// Connection options and rdkafka client construction
pub mod client;
pub mod error;

// Re-export main types for easy access
pub use client::{
    KafkaOpts, PublishTarget, CONSUMER_CLIENT_ID, CONSUMER_GROUP_ID, PRODUCER_CLIENT_ID,
};
pub use error::{Error, Result};
