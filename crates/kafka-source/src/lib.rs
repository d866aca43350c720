//! Kafka source for quotefeed: the subscriber loop that reads quote
//! messages back off the topic, decodes them with the configured codec, and
//! reports each one to the caller.
//!
//! The loop is a single logical consumer. It polls with a fixed timeout,
//! treats end-of-partition as information rather than an error, skips
//! messages it cannot decode, and stops on the first broker-level error, an
//! optional message limit, or Ctrl+C.

/// The polling loop, its configuration, and the shutdown signal hookup
pub mod consumer;

// Re-exports for convenience
pub use consumer::{run, setup_shutdown_handler, Config, DecodedQuote};
