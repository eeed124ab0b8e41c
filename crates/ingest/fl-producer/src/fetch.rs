//! Upstream flight API client.

use fl_error::{IngestError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Client for the upstream flight API.
///
/// Each [`fetch`](ApiClient::fetch) issues one GET bounded by an absolute
/// timeout covering connect, headers and body.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client for `url` with its own HTTP connection pool.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::ApiTransport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, url, timeout))
    }

    /// Create a client reusing an existing HTTP client.
    pub fn with_client(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    /// The configured endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the current flight list.
    ///
    /// # Errors
    ///
    /// - [`IngestError::ApiTimeout`] if the request exceeds the timeout
    /// - [`IngestError::ApiTransport`] on any other transport failure
    /// - [`IngestError::ApiStatus`] on a non-success status
    /// - [`IngestError::MalformedPayload`] if the body is not the expected shape
    pub async fn fetch(&self) -> Result<Vec<serde_json::Value>> {
        match tokio::time::timeout(self.timeout, self.fetch_body()).await {
            Ok(body) => parse_response_body(&body?),
            Err(_) => Err(IngestError::ApiTimeout(self.timeout).into()),
        }
    }

    async fn fetch_body(&self) -> Result<Vec<u8>> {
        debug!(url = %self.url, timeout_ms = self.timeout.as_millis() as u64, "Requesting flight data");

        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::ApiStatus {
                code: status.as_u16(),
            }
            .into());
        }

        info!(status = status.as_u16(), "API responded");

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(body.to_vec())
    }

    fn transport_error(&self, error: reqwest::Error) -> IngestError {
        if error.is_timeout() {
            IngestError::ApiTimeout(self.timeout)
        } else {
            IngestError::ApiTransport(error.to_string())
        }
    }
}

/// Extracts the flight list from an API response body.
///
/// The body must be a JSON object. Its `response` field holds the flights;
/// a missing or null `response` is an empty list.
pub fn parse_response_body(body: &[u8]) -> Result<Vec<serde_json::Value>> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| IngestError::MalformedPayload(format!("Body is not JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| IngestError::MalformedPayload("Body is not a JSON object".to_string()))?;

    match object.get("response") {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(IngestError::MalformedPayload(format!(
            "'response' is not an array: {}",
            json_type_name(other)
        ))
        .into()),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_error::FlError;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_response_body() {
        let body = br#"{"response": [{"hex": "abc123"}, {"hex": "def456"}]}"#;
        let items = parse_response_body(body).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["hex"], "def456");
    }

    #[test]
    fn test_parse_missing_response_is_empty() {
        assert!(parse_response_body(br#"{"request": {}}"#).unwrap().is_empty());
        assert!(parse_response_body(br#"{"response": null}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        let bodies: [&[u8]; 3] = [b"not json", br#"[1, 2]"#, br#"{"response": "oops"}"#];
        for body in bodies {
            assert!(matches!(
                parse_response_body(body),
                Err(FlError::Ingest(IngestError::MalformedPayload(_)))
            ));
        }
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flights"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"response": [{"hex": "abc123"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(format!("{}/flights", server.uri()), Duration::from_secs(5)).unwrap();
        let items = client.fetch().await.unwrap();

        assert_eq!(items, vec![json!({"hex": "abc123"})]);
    }

    #[tokio::test]
    async fn test_fetch_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let result = client.fetch().await;

        assert!(matches!(
            result,
            Err(FlError::Ingest(IngestError::ApiStatus { code: 503 }))
        ));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Duration::from_millis(200)).unwrap();
        let result = client.fetch().await;

        assert!(matches!(
            result,
            Err(FlError::Ingest(IngestError::ApiTimeout(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_transport_error() {
        // Nothing listens on port 9 on loopback
        let client = ApiClient::new("http://127.0.0.1:9/flights", Duration::from_secs(2)).unwrap();
        let result = client.fetch().await;

        assert!(matches!(
            result,
            Err(FlError::Ingest(IngestError::ApiTransport(_)))
        ));
    }
}
