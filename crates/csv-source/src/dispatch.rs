//! Concurrent file dispatch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quote_core::QuoteCodec;
use quotefeed_kafka::PublishTarget;
use rdkafka::producer::Producer;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::error::Result;
use crate::worker::{publish_file, FileSummary, DEFAULT_BATCH_SIZE};

/// Default cap on concurrently processed files.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Aggregate outcome of one produce run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub files_total: u64,
    pub files_completed: u64,
    pub files_failed: u64,
    pub rows_processed: u64,
    pub deliveries_failed: u64,
}

impl DispatchSummary {
    fn record_file(&mut self, file: &FileSummary) {
        self.rows_processed += file.rows_processed;
        self.deliveries_failed += file.deliveries_failed;
        if file.is_failed() {
            self.files_failed += 1;
        } else {
            self.files_completed += 1;
        }
    }
}

/// Publishes a set of CSV files through a bounded pool of per-file workers.
///
/// All workers share one producer handle and one codec; both are safe for
/// concurrent use, the codec because it is read-only after construction.
pub struct QuotePublisher {
    codec: Arc<QuoteCodec>,
    target: Option<PublishTarget>,
    max_workers: usize,
    batch_size: usize,
}

impl QuotePublisher {
    /// Publisher with the default worker cap and batch size. `target` of
    /// `None` selects print-only mode.
    pub fn new(codec: QuoteCodec, target: Option<PublishTarget>) -> Self {
        Self {
            codec: Arc::new(codec),
            target,
            max_workers: DEFAULT_MAX_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Run one worker per file, at most `max_workers` at a time, and wait
    /// for every one of them. A file that fails mid-way does not disturb
    /// the others; its partial counts still land in the summary. After the
    /// join, one final flush on the shared producer handle guarantees no
    /// message is left queued by an aborted worker.
    pub async fn publish_files(&self, files: Vec<PathBuf>) -> Result<DispatchSummary> {
        let mut summary = DispatchSummary {
            files_total: files.len() as u64,
            ..DispatchSummary::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut handles = Vec::with_capacity(files.len());
        for file in files {
            let semaphore = Arc::clone(&semaphore);
            let codec = Arc::clone(&self.codec);
            let target = self.target.clone();
            let batch_size = self.batch_size;
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                publish_file(file, codec, target, batch_size).await
            }));
        }
        info!(
            "Started {} worker(s), up to {} concurrent",
            handles.len(),
            self.max_workers
        );

        for handle in handles {
            match handle.await {
                Ok(file_summary) => summary.record_file(&file_summary),
                Err(e) => {
                    error!("Worker task failed: {e}");
                    summary.files_failed += 1;
                }
            }
        }

        if let Some(target) = &self.target {
            info!("Flushing remaining messages");
            target.producer.flush(Duration::from_secs(30))?;
        }

        info!(
            "All workers finished: {}/{} files completed, {} rows processed, {} delivery failures",
            summary.files_completed,
            summary.files_total,
            summary.rows_processed,
            summary.deliveries_failed
        );
        Ok(summary)
    }
}
