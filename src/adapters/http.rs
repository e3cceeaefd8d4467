//! HTTP catalog source.
//!
//! One unauthenticated GET returning a JSON array of lesson records.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::{CatalogError, CatalogSource};

/// Public lesson endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.askharekrishna.com/api/v1/kirtans";

/// Catalog source backed by a JSON endpoint
pub struct HttpCatalogSource {
    /// Endpoint URL
    endpoint: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpCatalogSource {
    /// Create a source with a request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Create from the resolved configuration
    pub fn from_config(config: &crate::config::ResolvedConfig) -> Self {
        Self::new(
            config.catalog.endpoint.clone(),
            Duration::from_secs(config.catalog.timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> Result<Vec<Value>, CatalogError> {
        info!(endpoint = %self.endpoint, "Fetching lesson catalog");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        match body {
            Value::Array(records) => {
                debug!(records = records.len(), "Catalog response received");
                Ok(records)
            }
            other => Err(CatalogError::Parse(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_creation() {
        let source = HttpCatalogSource::new(DEFAULT_ENDPOINT, Duration::from_secs(5));
        assert_eq!(source.name(), "http");
        assert_eq!(source.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!({"a": 1})), "an object");
        assert_eq!(json_kind(&json!(null)), "null");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let source = HttpCatalogSource::new("http://127.0.0.1:9/kirtans", Duration::from_secs(2));
        let result = source.fetch().await;
        assert!(matches!(result, Err(CatalogError::Network(_))));
    }
}
