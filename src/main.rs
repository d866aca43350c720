//! Command-line interface for quotefeed
//!
//! # Usage Examples
//!
//! ## Produce
//! ```bash
//! # Publish every CSV file in data/ to the configured topic
//! quotefeed produce data \
//!   --brokers localhost:9092 \
//!   --topic historical-quotes
//!
//! # Inspect transformed records without a broker (print-only mode)
//! quotefeed produce data/HistoricalData_AAPL.csv
//!
//! # JSON wire format, stricter exit code, narrower worker pool
//! quotefeed produce data \
//!   --brokers localhost:9092 --topic historical-quotes \
//!   --format json --strict --max-workers 2
//! ```
//!
//! ## Consume
//! ```bash
//! # Read back and report the first 10 messages
//! quotefeed consume \
//!   --brokers localhost:9092 --topic historical-quotes --limit 10
//! ```
//!
//! Connection settings can also come from the environment, including a
//! `.env` file in the working directory: `KAFKA_BOOTSTRAP_SERVERS`,
//! `KAFKA_TOPIC`, `KAFKA_SECURITY_PROTOCOL`, `KAFKA_SASL_MECHANISM`,
//! `KAFKA_SASL_USERNAME`, `KAFKA_SASL_PASSWORD`. Without brokers, produce
//! runs in print-only mode: rows are transformed and logged, not published.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use quote_core::{QuoteCodec, QuoteSchema};
use quotefeed_csv_source::{discover_csv_files, QuotePublisher};
use quotefeed_kafka::KafkaOpts;

#[derive(Parser)]
#[command(name = "quotefeed")]
#[command(about = "Publishes historical stock quote CSVs to Kafka and consumes them back")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish quote CSV files to Kafka
    Produce {
        /// A CSV file, or a directory containing CSV files
        path: PathBuf,

        /// Wire format for published messages
        #[arg(long, value_enum, default_value_t = WireFormat::Avro)]
        format: WireFormat,

        /// Directory holding the Avro schema (.avsc); defaults to the
        /// directory of the first discovered CSV file
        #[arg(long, value_name = "DIR")]
        schema_dir: Option<PathBuf>,

        /// Maximum number of files processed concurrently
        #[arg(long, default_value_t = quotefeed_csv_source::DEFAULT_MAX_WORKERS)]
        max_workers: usize,

        /// Rows encoded and awaited per delivery batch
        #[arg(long, default_value_t = quotefeed_csv_source::DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Exit non-zero if any file fails or any delivery is dropped
        #[arg(long)]
        strict: bool,

        /// Kafka connection options
        #[command(flatten)]
        kafka: KafkaOpts,
    },

    /// Consume quote messages from Kafka and report them
    Consume {
        /// Wire format of the messages on the topic
        #[arg(long, value_enum, default_value_t = WireFormat::Avro)]
        format: WireFormat,

        /// Directory holding the Avro schema (.avsc)
        #[arg(long, value_name = "DIR", default_value = "data")]
        schema_dir: PathBuf,

        /// Consumer loop configuration
        #[command(flatten)]
        config: quotefeed_kafka_source::Config,
    },
}

/// Message encoding on the wire
#[derive(Clone, Copy, Debug, ValueEnum)]
enum WireFormat {
    /// Schema-validated Avro datum (needs an .avsc schema on both ends)
    #[value(name = "avro")]
    Avro,
    /// Self-describing JSON
    #[value(name = "json")]
    Json,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // A .env file may supply the KAFKA_* variables clap reads during parse
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Produce {
            path,
            format,
            schema_dir,
            max_workers,
            batch_size,
            strict,
            kafka,
        } => {
            run_produce(
                path,
                format,
                schema_dir,
                max_workers,
                batch_size,
                strict,
                kafka,
            )
            .await
        }
        Commands::Consume {
            format,
            schema_dir,
            config,
        } => run_consume(format, schema_dir, config).await,
    }
}

async fn run_produce(
    path: PathBuf,
    format: WireFormat,
    schema_dir: Option<PathBuf>,
    max_workers: usize,
    batch_size: usize,
    strict: bool,
    kafka: KafkaOpts,
) -> anyhow::Result<()> {
    let files = discover_csv_files(&path).await?;
    tracing::info!("Found {} CSV file(s) to process", files.len());

    let schema_dir = match schema_dir {
        Some(dir) => dir,
        None => files
            .first()
            .and_then(|f| f.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf(),
    };
    let codec = build_codec(format, &schema_dir)?;

    let target = kafka.publish_target()?;
    if let Some(target) = &target {
        tracing::info!("Will produce messages to topic: {}", target.topic);
    }

    let publisher = QuotePublisher::new(codec, target)
        .with_max_workers(max_workers)
        .with_batch_size(batch_size);
    let summary = publisher.publish_files(files).await?;

    if strict && (summary.files_failed > 0 || summary.deliveries_failed > 0) {
        anyhow::bail!(
            "{} of {} files failed, {} deliveries dropped",
            summary.files_failed,
            summary.files_total,
            summary.deliveries_failed
        );
    }
    Ok(())
}

async fn run_consume(
    format: WireFormat,
    schema_dir: PathBuf,
    config: quotefeed_kafka_source::Config,
) -> anyhow::Result<()> {
    let codec = build_codec(format, &schema_dir)?;
    let shutdown = quotefeed_kafka_source::setup_shutdown_handler();

    quotefeed_kafka_source::run(config, codec, shutdown, |quote| {
        tracing::info!(
            "[{}] Topic: {}, Partition: {}, Offset: {}, Key: {}",
            quote.index,
            quote.topic,
            quote.partition,
            quote.offset,
            quote.key.as_deref().unwrap_or("none")
        );
        tracing::info!("    {:?}", quote.record);
    })
    .await?;
    Ok(())
}

fn build_codec(format: WireFormat, schema_dir: &Path) -> anyhow::Result<QuoteCodec> {
    match format {
        WireFormat::Avro => {
            let schema = QuoteSchema::load(schema_dir).with_context(|| {
                format!("Failed to load Avro schema from {}", schema_dir.display())
            })?;
            Ok(QuoteCodec::avro(schema))
        }
        WireFormat::Json => Ok(QuoteCodec::json()),
    }
}
