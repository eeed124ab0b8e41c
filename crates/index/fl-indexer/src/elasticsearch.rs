//! Elasticsearch store over the REST API.

use async_trait::async_trait;
use fl_error::{IndexerError, Result};
use fl_traits::{is_retryable_es_error, IndexDocument, IndexResult, IndexStore, RecordFailure};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default cluster URL.
pub const DEFAULT_ES_URL: &str = "http://localhost:9200";

/// Connection settings for [`ElasticsearchStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Base URL of the cluster
    pub url: String,

    /// Basic auth user
    #[serde(default)]
    pub username: Option<String>,

    /// Basic auth password
    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl ElasticsearchConfig {
    /// Create a configuration for the given cluster URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// Set basic auth credentials.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ES_URL)
    }
}

/// [`IndexStore`] backed by an Elasticsearch cluster.
#[derive(Debug, Clone)]
pub struct ElasticsearchStore {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticsearchStore {
    /// Create a store for the configured cluster.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| IndexerError::Connection(format!("Failed to create HTTP client: {e}")))?;

        info!(url = %config.url, "Elasticsearch store configured");

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.client.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        builder
            .send()
            .await
            .map_err(|e| IndexerError::Connection(e.to_string()).into())
    }
}

#[async_trait]
impl IndexStore for ElasticsearchStore {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self.send(self.request(Method::HEAD, index)).await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(status_error(status, Value::Null, index).into()),
        }
    }

    async fn create_index(&self, index: &str, schema: &Value) -> Result<()> {
        let response = self
            .send(self.request(Method::PUT, index).json(schema))
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(index, "Index created");
            return Ok(());
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        if error_type(&body) == Some("resource_already_exists_exception") {
            return Err(IndexerError::AlreadyExists(index.to_string()).into());
        }

        Err(status_error(status, body, index).into())
    }

    async fn get_schema(&self, index: &str) -> Result<Option<Value>> {
        let response = self
            .send(self.request(Method::GET, &format!("{index}/_mapping")))
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| IndexerError::Connection(format!("Invalid mapping response: {e}")))?;

        if !status.is_success() {
            return Err(status_error(status, body, index).into());
        }

        // Keyed by concrete index name, which differs from `index` for aliases
        let mappings = body
            .as_object()
            .and_then(|indices| indices.values().next())
            .map(|entry| entry["mappings"].clone())
            .unwrap_or(Value::Null);

        Ok(Some(json!({ "mappings": mappings })))
    }

    async fn bulk_write(&self, index: &str, documents: &[IndexDocument]) -> Result<IndexResult> {
        if documents.is_empty() {
            return Ok(IndexResult::default());
        }

        let start = Instant::now();
        let body = bulk_body(index, documents)?;
        let bytes_sent = body.len() as u64;

        debug!(index, documents = documents.len(), bytes = bytes_sent, "Sending bulk request");

        let response = self
            .send(
                self.request(Method::POST, "_bulk")
                    .header("Content-Type", "application/x-ndjson")
                    .body(body),
            )
            .await?;

        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| IndexerError::BulkFailed(format!("Invalid bulk response: {e}")))?;

        if !status.is_success() {
            return Err(status_error(status, body, index).into());
        }

        let failures = bulk_failures(&body);
        let success_count = documents.len().saturating_sub(failures.len()) as u64;

        if !failures.is_empty() {
            warn!(index, failed = failures.len(), "Bulk request had item failures");
        }

        Ok(IndexResult::success(success_count, bytes_sent, start.elapsed()).with_failures(failures))
    }

    async fn health_check(&self) -> Result<bool> {
        let response = match self.request(Method::GET, "_cluster/health").send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Elasticsearch health check failed");
                return Ok(false);
            }
        };

        if !response.status().is_success() {
            return Ok(false);
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(matches!(body["status"].as_str(), Some("green") | Some("yellow")))
    }
}

/// Builds the NDJSON body of a bulk request.
fn bulk_body(index: &str, documents: &[IndexDocument]) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(documents.len() * 512);

    for doc in documents {
        let action = match &doc.id {
            Some(id) => json!({"index": {"_index": index, "_id": id}}),
            None => json!({"index": {"_index": index}}),
        };
        for line in [&action, &doc.body] {
            serde_json::to_writer(&mut body, line)
                .map_err(|e| IndexerError::BulkFailed(format!("Failed to encode document: {e}")))?;
            body.push(b'\n');
        }
    }

    Ok(body)
}

/// Extracts per-item failures from a bulk response.
fn bulk_failures(body: &Value) -> Vec<RecordFailure> {
    if body["errors"].as_bool() != Some(true) {
        return Vec::new();
    }

    let Some(items) = body["items"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let result = item.as_object()?.values().next()?;
            let error = result.get("error")?;

            let error_type = error["type"].as_str().unwrap_or("unknown");
            let reason = error["reason"].as_str().unwrap_or("");
            let status = result["status"].as_u64().unwrap_or(0);

            let mut failure = RecordFailure::new(position as u64, error_type, reason);
            if let Some(id) = result["_id"].as_str() {
                failure = failure.with_doc_id(id);
            }
            if is_retryable_es_error(error_type) || status == 429 {
                failure = failure.retryable();
            }
            Some(failure)
        })
        .collect()
}

fn error_type(body: &Value) -> Option<&str> {
    body["error"]["type"].as_str()
}

fn error_reason(body: &Value) -> String {
    body["error"]["reason"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Maps a failed response status onto the indexer taxonomy.
fn status_error(status: StatusCode, body: Value, index: &str) -> IndexerError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => IndexerError::RateLimited(error_reason(&body)),
        StatusCode::NOT_FOUND => IndexerError::NotFound(index.to_string()),
        StatusCode::BAD_REQUEST => IndexerError::MappingError(error_reason(&body)),
        status if status.is_server_error() => {
            IndexerError::Unavailable(format!("HTTP {}: {}", status.as_u16(), error_reason(&body)))
        }
        status => IndexerError::BulkFailed(format!("HTTP {}: {}", status.as_u16(), error_reason(&body))),
    }
}
