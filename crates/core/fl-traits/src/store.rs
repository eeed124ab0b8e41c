//! Index store trait and related types.

use async_trait::async_trait;
use fl_error::Result;
use std::time::Duration;

/// A document to write to the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    /// Document id; `None` lets the store assign one
    pub id: Option<String>,

    /// Document body
    pub body: serde_json::Value,
}

impl IndexDocument {
    /// Creates a new document.
    pub fn new(id: Option<String>, body: serde_json::Value) -> Self {
        Self { id, body }
    }
}

/// Trait for searchable document stores.
///
/// # Implementations
///
/// - Elasticsearch store: REST API with bulk partial failure handling
/// - Memory store: in-process map for tests and dry runs
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Returns true if the named index exists.
    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Creates the named index with the given schema document.
    ///
    /// Fails with [`IndexerError::AlreadyExists`](fl_error::IndexerError::AlreadyExists)
    /// when another caller created the index first.
    async fn create_index(&self, index: &str, schema: &serde_json::Value) -> Result<()>;

    /// Returns the current schema of the named index, or `None` if it does not exist.
    async fn get_schema(&self, index: &str) -> Result<Option<serde_json::Value>>;

    /// Writes documents. Documents with the same id replace each other.
    ///
    /// Per-document failures are reported in the result, not as an error.
    async fn bulk_write(&self, index: &str, documents: &[IndexDocument]) -> Result<IndexResult>;

    /// Checks if the store is reachable and can accept data.
    async fn health_check(&self) -> Result<bool>;
}

/// Result of writing a batch of documents.
#[derive(Debug, Clone, Default)]
pub struct IndexResult {
    /// Number of documents successfully written
    pub success_count: u64,

    /// Details of failed documents
    pub failed_records: Vec<RecordFailure>,

    /// Total bytes sent to the store
    pub bytes_sent: u64,

    /// Time taken for the write
    pub duration: Duration,
}

impl IndexResult {
    /// Creates a new successful result.
    pub fn success(count: u64, bytes: u64, duration: Duration) -> Self {
        Self {
            success_count: count,
            failed_records: Vec::new(),
            bytes_sent: bytes,
            duration,
        }
    }

    /// Creates a result with failures.
    pub fn with_failures(mut self, failures: Vec<RecordFailure>) -> Self {
        self.failed_records = failures;
        self
    }
}

/// Details about a single failed document.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    /// Position of the document within the submitted slice
    pub offset_in_batch: u64,

    /// Document id if available
    pub doc_id: Option<String>,

    /// Error type (e.g., "mapper_parsing_exception")
    pub error_type: String,

    /// Human-readable error message
    pub error_message: String,

    /// Whether this error is retryable
    pub retryable: bool,
}

impl RecordFailure {
    /// Creates a new record failure.
    pub fn new(
        offset_in_batch: u64,
        error_type: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            offset_in_batch,
            doc_id: None,
            error_type: error_type.into(),
            error_message: error_message.into(),
            retryable: false,
        }
    }

    /// Sets the document id.
    pub fn with_doc_id(mut self, id: impl Into<String>) -> Self {
        self.doc_id = Some(id.into());
        self
    }

    /// Marks this error as retryable.
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

/// Checks if an Elasticsearch error type is retryable.
pub fn is_retryable_es_error(error_type: &str) -> bool {
    matches!(
        error_type,
        "es_rejected_execution_exception"  // Queue full
            | "cluster_block_exception"    // Cluster overwhelmed
            | "timeout_exception"          // Network timeout
            | "circuit_breaking_exception" // Memory pressure
            | "unavailable_shards_exception"
    )
}
