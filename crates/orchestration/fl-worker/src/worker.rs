//! Main worker loop.

use crate::config::WorkerConfig;
use crate::stats::{StatsSnapshot, WorkerStats};
use fl_enrichment::{enrich_batch, SnapshotHandle};
use fl_error::{FlError, Result};
use fl_indexer::IndexSchemaManager;
use fl_traits::{RecordSource, SourceMessage};
use fl_types::FlightRecord;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Consumes raw flight records, enriches them and writes them to the index.
pub struct Worker<S: RecordSource> {
    config: WorkerConfig,
    source: Arc<S>,
    snapshot: Arc<SnapshotHandle>,
    manager: Arc<IndexSchemaManager>,
    stats: Arc<WorkerStats>,
}

impl<S: RecordSource + 'static> Worker<S> {
    /// Create a new worker.
    pub fn new(
        config: WorkerConfig,
        source: S,
        snapshot: Arc<SnapshotHandle>,
        manager: Arc<IndexSchemaManager>,
    ) -> Self {
        Self {
            config,
            source: Arc::new(source),
            snapshot,
            manager,
            stats: Arc::new(WorkerStats::new()),
        }
    }

    /// Get a reference to the worker statistics.
    pub fn stats(&self) -> &Arc<WorkerStats> {
        &self.stats
    }

    /// Get a reference to the source.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Runs until the source is exhausted or `cancel` fires.
    ///
    /// A batch in progress when `cancel` fires is finished and committed.
    /// A batch whose write fails as a whole stops the run without committing,
    /// so its messages are delivered again on the next start.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<StatsSnapshot> {
        self.config.validate().map_err(FlError::Config)?;

        info!(
            batch_size = self.config.batch_size,
            index = %self.manager.index(),
            "Starting worker"
        );

        let result = self.run_loop(cancel).await;

        let mut stats = self.stats.snapshot();
        stats.completed_at = Some(chrono::Utc::now());

        info!(
            received = stats.received,
            malformed = stats.malformed,
            written = stats.written,
            failed = stats.failed,
            batches = stats.batches,
            "Worker completed"
        );

        result.map(|()| stats)
    }

    async fn run_loop(&self, cancel: &CancellationToken) -> Result<()> {
        loop {
            let received = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Cancellation requested, stopping worker");
                    return Ok(());
                }
                received = self.source.receive(self.config.batch_size, self.config.poll_wait) => received,
            };

            let messages = match received {
                Ok(Some(messages)) => messages,
                Ok(None) => {
                    debug!("Source exhausted, stopping worker");
                    return Ok(());
                }
                Err(e) => {
                    error!(error = %e, "Failed to receive from source");
                    self.stats.record_source_error();
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        _ = tokio::time::sleep(self.config.error_backoff) => continue,
                    }
                }
            };

            if messages.is_empty() {
                continue;
            }

            self.process_batch(&messages).await?;
        }
    }

    async fn process_batch(&self, messages: &[SourceMessage]) -> Result<()> {
        self.stats.record_received(messages.len() as u64);

        let records = self.parse(messages);
        let enriched_count = records.len() as u64;

        // One snapshot for the whole batch, even if a reload lands meanwhile
        let snapshot = self.snapshot.load();
        let enriched = tokio::task::spawn_blocking(move || enrich_batch(records, &snapshot))
            .await
            .map_err(|e| FlError::Other(anyhow::anyhow!("Enrichment task failed: {e}")))?;

        let summary = match self.manager.write_batch(&enriched).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(
                    error = %e,
                    first = %messages[0].id,
                    count = messages.len(),
                    "Batch write failed, leaving messages uncommitted"
                );
                return Err(e);
            }
        };

        self.stats.record_batch(
            enriched_count,
            summary.written as u64,
            summary.failed as u64,
        );

        if let Err(e) = self.source.commit(messages).await {
            // A later commit covers these offsets too
            warn!(error = %e, count = messages.len(), "Failed to commit batch");
            self.stats.record_source_error();
        }

        debug!(
            received = messages.len(),
            written = summary.written,
            failed = summary.failed,
            "Batch processed"
        );

        Ok(())
    }

    fn parse(&self, messages: &[SourceMessage]) -> Vec<FlightRecord> {
        messages
            .iter()
            .filter_map(|message| match serde_json::from_slice::<FlightRecord>(&message.payload) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(id = %message.id, error = %e, "Skipping malformed flight record");
                    self.stats.record_malformed();
                    None
                }
            })
            .collect()
    }
}
