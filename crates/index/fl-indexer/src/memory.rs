//! In-process index store for tests and dry runs.

use async_trait::async_trait;
use fl_error::{IndexerError, Result};
use fl_traits::{IndexDocument, IndexResult, IndexStore, RecordFailure};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug, Default)]
struct MemoryIndex {
    schema: Value,
    documents: BTreeMap<String, Value>,
}

/// [`IndexStore`] keeping documents in memory, keyed by id.
///
/// Documents without an id get a generated one. Failure injection:
///
/// - [`with_create_race`](MemoryIndexStore::with_create_race): the next
///   `create_index` behaves as if another caller created the index between
///   the existence check and the create
/// - [`with_transient_failures`](MemoryIndexStore::with_transient_failures):
///   writes of a document id are rejected with a retryable error a fixed
///   number of times
/// - [`with_rejected`](MemoryIndexStore::with_rejected): writes of a document
///   id are always rejected with a permanent error
#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    indices: RwLock<HashMap<String, MemoryIndex>>,
    create_race: AtomicBool,
    transient: Mutex<HashMap<String, u32>>,
    rejected: HashSet<String>,
    next_id: AtomicU64,
    bulk_calls: AtomicU64,
    create_calls: AtomicU64,
}

impl MemoryIndexStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_index` lose a creation race.
    pub fn with_create_race(self) -> Self {
        self.create_race.store(true, Ordering::SeqCst);
        self
    }

    /// Reject writes of `id` with a retryable error `times` times.
    pub fn with_transient_failures(self, id: impl Into<String>, times: u32) -> Self {
        self.transient.lock().insert(id.into(), times);
        self
    }

    /// Always reject writes of `id`.
    pub fn with_rejected(mut self, id: impl Into<String>) -> Self {
        self.rejected.insert(id.into());
        self
    }

    /// Returns a stored document.
    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.indices
            .read()
            .get(index)
            .and_then(|idx| idx.documents.get(id).cloned())
    }

    /// Returns the number of documents in an index.
    pub fn document_count(&self, index: &str) -> usize {
        self.indices
            .read()
            .get(index)
            .map(|idx| idx.documents.len())
            .unwrap_or(0)
    }

    /// Returns how many bulk requests were received.
    pub fn bulk_calls(&self) -> u64 {
        self.bulk_calls.load(Ordering::Relaxed)
    }

    /// Returns how many create requests were received.
    pub fn create_calls(&self) -> u64 {
        self.create_calls.load(Ordering::Relaxed)
    }

    fn take_transient_failure(&self, id: &str) -> bool {
        let mut transient = self.transient.lock();
        match transient.get_mut(id) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        Ok(self.indices.read().contains_key(index))
    }

    async fn create_index(&self, index: &str, schema: &Value) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::Relaxed);
        let mut indices = self.indices.write();

        if self.create_race.swap(false, Ordering::SeqCst) {
            indices.entry(index.to_string()).or_insert_with(|| MemoryIndex {
                schema: schema.clone(),
                documents: BTreeMap::new(),
            });
            return Err(IndexerError::AlreadyExists(index.to_string()).into());
        }

        if indices.contains_key(index) {
            return Err(IndexerError::AlreadyExists(index.to_string()).into());
        }

        indices.insert(
            index.to_string(),
            MemoryIndex {
                schema: schema.clone(),
                documents: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn get_schema(&self, index: &str) -> Result<Option<Value>> {
        Ok(self.indices.read().get(index).map(|idx| idx.schema.clone()))
    }

    async fn bulk_write(&self, index: &str, documents: &[IndexDocument]) -> Result<IndexResult> {
        self.bulk_calls.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        let mut failures = Vec::new();
        let mut bytes_sent = 0u64;

        let mut indices = self.indices.write();
        // Writes to a missing index create it, as a dynamic-mapping cluster does
        let target = indices.entry(index.to_string()).or_default();

        for (position, doc) in documents.iter().enumerate() {
            let id = match &doc.id {
                Some(id) => id.clone(),
                None => format!("auto-{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
            };

            if self.rejected.contains(&id) {
                failures.push(
                    RecordFailure::new(position as u64, "mapper_parsing_exception", "rejected")
                        .with_doc_id(id),
                );
                continue;
            }

            if self.take_transient_failure(&id) {
                failures.push(
                    RecordFailure::new(position as u64, "es_rejected_execution_exception", "queue full")
                        .with_doc_id(id)
                        .retryable(),
                );
                continue;
            }

            bytes_sent += doc.body.to_string().len() as u64;
            target.documents.insert(id, doc.body.clone());
        }

        let success_count = (documents.len() - failures.len()) as u64;
        Ok(IndexResult::success(success_count, bytes_sent, start.elapsed()).with_failures(failures))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
