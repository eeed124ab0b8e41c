//! Error types and classification for flightline.
//!
//! This crate provides:
//! - [`FlError`] - Top-level error enum for all pipeline errors
//! - Domain-specific errors ([`IngestError`], [`PublishError`], [`ReferenceError`],
//!   [`IndexerError`], [`SourceError`])
//! - [`ErrorCategory`] for retry decisions
//! - Error classification logic based on error type and processing stage

use thiserror::Error;

/// Top-level error type for flightline.
#[derive(Error, Debug)]
pub enum FlError {
    /// Upstream API fetch errors (timeout, transport, status, payload)
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Message broker publish errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Reference table loading errors
    #[error("Reference data error: {0}")]
    Reference(#[from] ReferenceError),

    /// Index store errors (connection, schema, bulk API)
    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),

    /// Message source errors (consume, commit)
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The run was cancelled before it could produce a result
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised while fetching flight records from the upstream API.
///
/// All of these are fatal to a producer run: nothing is published once one
/// of them occurs.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The request did not complete within the configured timeout
    #[error("API request timed out after {0:?}")]
    ApiTimeout(std::time::Duration),

    /// Connection, DNS, TLS or other transport failure
    #[error("API request failed: {0}")]
    ApiTransport(String),

    /// The API answered with a non-success status code
    #[error("API responded with status {code}")]
    ApiStatus { code: u16 },

    /// The response body is not the expected JSON shape
    #[error("Malformed API payload: {0}")]
    MalformedPayload(String),
}

/// Errors raised while publishing to the message broker.
#[derive(Error, Debug)]
pub enum PublishError {
    /// The broker did not acknowledge a message
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The broker client could not be created or rejected the message locally
    #[error("Client error: {0}")]
    Client(String),

    /// Flush did not complete within its timeout
    #[error("Flush failed: {0}")]
    Flush(String),

    /// A record could not be serialized
    #[error("Serialization failed: {0}")]
    Serialize(String),
}

/// Errors raised while loading reference tables.
#[derive(Error, Debug)]
pub enum ReferenceError {
    /// Source file not found
    #[error("Source not found: {0}")]
    NotFound(String),

    /// I/O error during read
    #[error("I/O error: {0}")]
    Io(String),

    /// CSV could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// A configured column is missing from the source header
    #[error("Schema error: {0}")]
    Schema(String),

    /// Remote source could not be fetched
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// Index store errors.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// Failed to connect to the index store
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Index creation lost a race with another creator
    #[error("Index already exists: {0}")]
    AlreadyExists(String),

    /// The named index does not exist
    #[error("Index not found: {0}")]
    NotFound(String),

    /// Bulk request failed as a whole
    #[error("Bulk index failed: {0}")]
    BulkFailed(String),

    /// Rate limited / throttled
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Cluster unavailable
    #[error("Cluster unavailable: {0}")]
    Unavailable(String),

    /// Index mapping error
    #[error("Mapping error: {0}")]
    MappingError(String),

    /// A single document write failed
    #[error("Write failed for {doc_id}: {reason}")]
    WriteFailed { doc_id: String, reason: String },
}

/// Message source errors.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to connect to or subscribe on the broker
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Failed to receive messages
    #[error("Receive failed: {0}")]
    Receive(String),

    /// Failed to commit consumed offsets
    #[error("Commit failed: {0}")]
    Commit(String),

    /// Message payload is not a flight record
    #[error("Deserialization failed: {0}")]
    Deserialize(String),
}

/// Error classification for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient error - retry with exponential backoff
    ///
    /// Examples: ES 429/503, broker connection reset
    Transient,

    /// Permanent error - never retry
    ///
    /// Examples: API timeout for this run, mapping conflict, bad CSV header
    Permanent,

    /// Partial failure - some records failed, continue processing
    ///
    /// Examples: individual delivery failures, some bulk items rejected
    Partial,
}

/// Processing stage for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Fetching records from the upstream API
    Fetch,

    /// Publishing records to the topic
    Publish,

    /// Loading reference tables
    ReferenceLoad,

    /// Enriching records
    Enrichment,

    /// Consuming records from the topic
    Consume,

    /// Writing documents to the index
    Indexing,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch => write!(f, "Fetch"),
            Self::Publish => write!(f, "Publish"),
            Self::ReferenceLoad => write!(f, "ReferenceLoad"),
            Self::Enrichment => write!(f, "Enrichment"),
            Self::Consume => write!(f, "Consume"),
            Self::Indexing => write!(f, "Indexing"),
        }
    }
}

/// Classifies an error to determine retry behavior.
///
/// # Arguments
///
/// * `error` - The error to classify
/// * `stage` - The processing stage where the error occurred
///
/// # Returns
///
/// The appropriate [`ErrorCategory`] for retry decisions
pub fn classify_error(error: &FlError, stage: ProcessingStage) -> ErrorCategory {
    match error {
        FlError::Ingest(_) => ErrorCategory::Permanent,
        FlError::Publish(e) => classify_publish_error(e),
        FlError::Reference(e) => classify_reference_error(e),
        FlError::Indexer(e) => classify_indexer_error(e),
        FlError::Source(e) => classify_source_error(e),
        FlError::Config(_) | FlError::Cancelled => ErrorCategory::Permanent,
        FlError::Other(e) => classify_anyhow_error(e, stage),
    }
}

fn classify_publish_error(error: &PublishError) -> ErrorCategory {
    match error {
        PublishError::Delivery(_) => ErrorCategory::Partial,
        PublishError::Client(_) => ErrorCategory::Transient,
        PublishError::Flush(_) => ErrorCategory::Transient,
        PublishError::Serialize(_) => ErrorCategory::Permanent,
    }
}

fn classify_reference_error(error: &ReferenceError) -> ErrorCategory {
    match error {
        ReferenceError::Fetch(_) => ErrorCategory::Transient,
        ReferenceError::NotFound(_)
        | ReferenceError::Io(_)
        | ReferenceError::Parse(_)
        | ReferenceError::Schema(_) => ErrorCategory::Permanent,
    }
}

fn classify_indexer_error(error: &IndexerError) -> ErrorCategory {
    match error {
        IndexerError::Connection(_) => ErrorCategory::Transient,
        IndexerError::AlreadyExists(_) => ErrorCategory::Permanent,
        IndexerError::NotFound(_) => ErrorCategory::Permanent,
        IndexerError::BulkFailed(_) => ErrorCategory::Transient,
        IndexerError::RateLimited(_) => ErrorCategory::Transient,
        IndexerError::Unavailable(_) => ErrorCategory::Transient,
        IndexerError::MappingError(_) => ErrorCategory::Permanent,
        IndexerError::WriteFailed { .. } => ErrorCategory::Partial,
    }
}

fn classify_source_error(error: &SourceError) -> ErrorCategory {
    match error {
        SourceError::Connection(_) => ErrorCategory::Transient,
        SourceError::Receive(_) => ErrorCategory::Transient,
        SourceError::Commit(_) => ErrorCategory::Transient,
        SourceError::Deserialize(_) => ErrorCategory::Permanent,
    }
}

fn classify_anyhow_error(error: &anyhow::Error, stage: ProcessingStage) -> ErrorCategory {
    let err_string = error.to_string().to_lowercase();

    match stage {
        ProcessingStage::Fetch | ProcessingStage::Enrichment => ErrorCategory::Permanent,
        ProcessingStage::ReferenceLoad => {
            if err_string.contains("not found") || err_string.contains("404") {
                ErrorCategory::Permanent
            } else {
                ErrorCategory::Transient
            }
        }
        ProcessingStage::Publish | ProcessingStage::Consume => ErrorCategory::Transient,
        ProcessingStage::Indexing => {
            if err_string.contains("429") || err_string.contains("503") {
                ErrorCategory::Transient
            } else if err_string.contains("400") || err_string.contains("mapper_parsing") {
                ErrorCategory::Permanent
            } else {
                ErrorCategory::Transient
            }
        }
    }
}

/// Result type alias using FlError.
pub type Result<T> = std::result::Result<T, FlError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fetch_errors_are_permanent() {
        let timeout = FlError::Ingest(IngestError::ApiTimeout(Duration::from_secs(10)));
        let status = FlError::Ingest(IngestError::ApiStatus { code: 503 });

        assert_eq!(
            classify_error(&timeout, ProcessingStage::Fetch),
            ErrorCategory::Permanent
        );
        assert_eq!(
            classify_error(&status, ProcessingStage::Fetch),
            ErrorCategory::Permanent
        );
    }

    #[test]
    fn test_delivery_failure_is_partial() {
        let error = FlError::Publish(PublishError::Delivery("broker down".to_string()));
        assert_eq!(
            classify_error(&error, ProcessingStage::Publish),
            ErrorCategory::Partial
        );
    }

    #[test]
    fn test_error_classification_indexer_rate_limited() {
        let error = FlError::Indexer(IndexerError::RateLimited(
            "429 Too Many Requests".to_string(),
        ));
        assert_eq!(
            classify_error(&error, ProcessingStage::Indexing),
            ErrorCategory::Transient
        );
    }

    #[test]
    fn test_anyhow_indexing_classification() {
        let error = FlError::Other(anyhow::anyhow!("HTTP 400 mapper_parsing_exception"));
        assert_eq!(
            classify_error(&error, ProcessingStage::Indexing),
            ErrorCategory::Permanent
        );

        let error = FlError::Other(anyhow::anyhow!("HTTP 503"));
        assert_eq!(
            classify_error(&error, ProcessingStage::Indexing),
            ErrorCategory::Transient
        );
    }

    #[test]
    fn test_error_display() {
        let error = FlError::Ingest(IngestError::ApiStatus { code: 404 });
        assert_eq!(error.to_string(), "Ingest error: API responded with status 404");

        let error = FlError::Reference(ReferenceError::NotFound("airports.csv".to_string()));
        assert!(error.to_string().contains("Source not found"));
    }

    #[test]
    fn test_processing_stage_display() {
        assert_eq!(ProcessingStage::Fetch.to_string(), "Fetch");
        assert_eq!(ProcessingStage::Indexing.to_string(), "Indexing");
    }
}
