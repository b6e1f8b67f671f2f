// HTTP transport boundary.
//
// Adapters build FeedRequests; a Transport executes one request and hands
// back the deserialized JSON body. The reqwest-backed implementation lives
// here; tests swap in MockTransport from the testing module.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use feedmix_common::{FeedError, Result};

/// Per-request timeout for the default HTTP transport. A stalled remote
/// would otherwise block the whole fetch indefinitely.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A single platform request, built by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl FeedRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Executes one request and deserializes the response body as JSON.
/// Implementations must support concurrent dispatch of independent requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &FeedRequest) -> Result<Value>;
}

/// reqwest-backed transport with a per-request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &FeedRequest) -> Result<Value> {
        debug!(method = %request.method, url = %request.url, "Executing feed request");

        let method: reqwest::Method = request
            .method
            .parse()
            .map_err(|_| FeedError::Network(format!("Invalid method: {}", request.method)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_request_carries_headers_in_order() {
        let request = FeedRequest::get("https://api.example/feed")
            .header("Authorization", "Bearer token")
            .header("Accept", "application/json");

        assert_eq!(request.method, "GET");
        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.headers[0].0, "Authorization");
        assert_eq!(request.headers[1].0, "Accept");
    }
}
