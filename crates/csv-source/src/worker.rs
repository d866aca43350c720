//! Per-file publisher worker.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use quote_core::{symbol_from_filename, transform, QuoteCodec, QuoteRecord, SourceRow};
use quotefeed_kafka::PublishTarget;
use rdkafka::producer::FutureRecord;
use tracing::{debug, error, info};

use crate::error::{Error, Result};

/// How long one send may wait for space in the producer queue.
const SEND_QUEUE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of rows encoded and awaited per delivery batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Outcome of one file's worker.
#[derive(Debug, Default)]
pub struct FileSummary {
    pub file: PathBuf,
    pub symbol: String,
    /// Rows transformed and either published or, in print-only mode, logged.
    pub rows_processed: u64,
    /// Messages the broker rejected; each is logged and dropped, not retried.
    pub deliveries_failed: u64,
    /// First row error, if the file was aborted.
    pub error: Option<String>,
}

impl FileSummary {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Publish every row of one CSV file.
///
/// Rows are read in order, transformed, encoded, and sent with the file's
/// symbol as the partition key. The first bad row aborts the rest of the
/// file; rows already encoded are still delivered before the worker
/// returns, and every delivery acknowledgment is awaited explicitly.
/// Without a publish target the worker logs each transformed record and
/// counts it as processed.
pub async fn publish_file(
    path: PathBuf,
    codec: Arc<QuoteCodec>,
    target: Option<PublishTarget>,
    batch_size: usize,
) -> FileSummary {
    let symbol = symbol_from_filename(&path);
    info!("Processing {} (symbol: {})", path.display(), symbol);

    let mut summary = FileSummary {
        file: path.clone(),
        symbol: symbol.clone(),
        ..FileSummary::default()
    };

    let outcome = publish_rows(
        &path,
        &symbol,
        &codec,
        target.as_ref(),
        batch_size,
        &mut summary,
    )
    .await;

    match outcome {
        Ok(()) => info!(
            "Completed {}: {} records processed",
            path.display(),
            summary.rows_processed
        ),
        Err(e) => {
            error!("Failed to process {}: {e}", path.display());
            summary.error = Some(e.to_string());
        }
    }
    summary
}

async fn publish_rows(
    path: &Path,
    symbol: &str,
    codec: &QuoteCodec,
    target: Option<&PublishTarget>,
    batch_size: usize,
    summary: &mut FileSummary,
) -> Result<()> {
    let contents = tokio::fs::read(path).await?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(std::io::Cursor::new(contents));

    let mut batch: Vec<Vec<u8>> = Vec::new();
    let mut failure: Option<Error> = None;

    for row in reader.deserialize::<SourceRow>() {
        let record = match parse_row(row, symbol) {
            Ok(record) => record,
            Err(e) => {
                failure = Some(e);
                break;
            }
        };
        match target {
            Some(target) => {
                match codec.encode(&record) {
                    Ok(payload) => batch.push(payload),
                    Err(e) => {
                        failure = Some(e.into());
                        break;
                    }
                }
                if batch.len() >= batch_size {
                    deliver_batch(target, symbol, &batch, summary).await;
                    batch.clear();
                }
            }
            None => info!("{record:?}"),
        }
        summary.rows_processed += 1;
    }

    // Rows encoded before a bad row still go out.
    if let Some(target) = target {
        if !batch.is_empty() {
            deliver_batch(target, symbol, &batch, summary).await;
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn parse_row(row: csv::Result<SourceRow>, symbol: &str) -> Result<QuoteRecord> {
    Ok(transform(row?, symbol)?)
}

/// Send one batch of payloads and await every delivery report.
async fn deliver_batch(
    target: &PublishTarget,
    key: &str,
    payloads: &[Vec<u8>],
    summary: &mut FileSummary,
) {
    let mut deliveries = Vec::with_capacity(payloads.len());
    for payload in payloads {
        let record = FutureRecord::to(&target.topic).key(key).payload(payload);
        deliveries.push(target.producer.send(record, SEND_QUEUE_TIMEOUT));
    }
    for delivery in deliveries {
        match delivery.await {
            Ok((partition, offset)) => debug!(
                "Message delivered to {} [{partition}] at offset {offset}",
                target.topic
            ),
            Err((e, _)) => {
                error!("Message delivery failed: {e}");
                summary.deliveries_failed += 1;
            }
        }
    }
}
