//! Index bootstrap and batch writes.

use crate::retry::{with_retry, RetryConfig};
use fl_error::{FlError, IndexerError, Result};
use fl_traits::{IndexDocument, IndexStore, RecordFailure};
use fl_types::FlightRecord;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Outcome of [`IndexSchemaManager::ensure_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    /// This call created the index
    Created,
    /// The index was already there; its schema was left untouched
    Exists,
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Exists => f.write_str("exists"),
        }
    }
}

/// Outcome of [`IndexSchemaManager::write_batch`].
#[derive(Debug, Clone, Default)]
pub struct WriteSummary {
    /// Documents persisted
    pub written: usize,

    /// Documents that could not be persisted after retries
    pub failed: usize,

    /// Final failure per failed document; `offset_in_batch` is the record's
    /// position in the input slice
    pub failures: Vec<RecordFailure>,
}

impl WriteSummary {
    /// Returns true if every document was written.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Prepares the destination index and writes enriched flights into it.
///
/// Safe to share between tasks: it holds no mutable state of its own, and
/// writes to different documents are independent.
pub struct IndexSchemaManager {
    store: Arc<dyn IndexStore>,
    index: String,
    retry: RetryConfig,
}

impl IndexSchemaManager {
    /// Create a manager for `index`.
    pub fn new(store: Arc<dyn IndexStore>, index: impl Into<String>) -> Self {
        Self {
            store,
            index: index.into(),
            retry: RetryConfig::default(),
        }
    }

    /// Set the retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The destination index.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn IndexStore> {
        &self.store
    }

    /// Creates the index with `schema` unless it already exists.
    ///
    /// An existing index is never modified. Losing a creation race to a
    /// concurrent caller reports [`IndexStatus::Exists`].
    pub async fn ensure_index(&self, schema: &Value) -> Result<IndexStatus> {
        let exists = with_retry(&self.retry, "index_exists", || {
            self.store.index_exists(&self.index)
        })
        .await?;

        if exists {
            info!(index = %self.index, "Index already exists");
            return Ok(IndexStatus::Exists);
        }

        let created = with_retry(&self.retry, "create_index", || {
            self.store.create_index(&self.index, schema)
        })
        .await;

        match created {
            Ok(()) => {
                info!(index = %self.index, "Index created");
                Ok(IndexStatus::Created)
            }
            Err(FlError::Indexer(IndexerError::AlreadyExists(_))) => {
                info!(index = %self.index, "Index created concurrently by another caller");
                Ok(IndexStatus::Exists)
            }
            Err(e) => Err(e),
        }
    }

    /// Writes enriched records, keyed by `hex`.
    ///
    /// Documents rejected with a retryable error are resubmitted with backoff
    /// up to the configured retry limit; what still fails is reported in the
    /// summary. A whole-request failure that outlives the retries is returned
    /// as an error, since nothing in the batch is known to be written.
    pub async fn write_batch(&self, records: &[FlightRecord]) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();
        if records.is_empty() {
            return Ok(summary);
        }

        // (position in `records`, document)
        let mut pending: Vec<(usize, IndexDocument)> = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            match serde_json::to_value(record) {
                Ok(body) => pending.push((
                    position,
                    IndexDocument::new(record.document_id().map(str::to_string), body),
                )),
                Err(e) => summary.failures.push(RecordFailure::new(
                    position as u64,
                    "serialization_error",
                    e.to_string(),
                )),
            }
        }

        let mut attempt = 0;
        while !pending.is_empty() {
            let documents: Vec<IndexDocument> =
                pending.iter().map(|(_, doc)| doc.clone()).collect();

            let result = with_retry(&self.retry, "bulk_write", || {
                self.store.bulk_write(&self.index, &documents)
            })
            .await?;

            debug!(
                attempt,
                written = result.success_count,
                failed = result.failed_records.len(),
                bytes = result.bytes_sent,
                duration_ms = result.duration.as_millis() as u64,
                "Bulk write attempt finished"
            );
            summary.written += result.success_count as usize;

            let mut retry_next = Vec::new();
            for failure in result.failed_records {
                let Some((position, doc)) = pending.get(failure.offset_in_batch as usize).cloned()
                else {
                    warn!(offset = failure.offset_in_batch, "Bulk failure for unknown document");
                    continue;
                };

                let failure = RecordFailure {
                    offset_in_batch: position as u64,
                    ..failure
                };

                if failure.retryable && attempt < self.retry.max_retries {
                    retry_next.push((position, doc));
                } else {
                    warn!(
                        index = %self.index,
                        doc_id = failure.doc_id.as_deref().unwrap_or(""),
                        error_type = %failure.error_type,
                        error = %failure.error_message,
                        "Document write failed"
                    );
                    summary.failures.push(failure);
                }
            }

            if retry_next.is_empty() {
                break;
            }

            let backoff = self.retry.backoff_duration(attempt);
            debug!(
                retrying = retry_next.len(),
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                "Retrying rejected documents"
            );
            sleep(backoff).await;

            pending = retry_next;
            attempt += 1;
        }

        summary.failures.sort_by_key(|f| f.offset_in_batch);
        summary.failed = summary.failures.len();

        debug!(
            index = %self.index,
            written = summary.written,
            failed = summary.failed,
            "Batch written"
        );

        Ok(summary)
    }
}
