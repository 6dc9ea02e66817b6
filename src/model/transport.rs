//! Model Transport
//!
//! The transport carries a prepared request body to the invocation
//! endpoint and hands back the raw response body. Request shaping and
//! response unwrapping live in the family layer; the transport owns
//! neither.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ModelConfig;
use crate::types::{PipelineError, Result};

/// One blocking remote call per invocation. No retries; a failed call
/// surfaces as `Upstream` and the caller decides skip or abort.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn send(&self, model_id: &str, body: Value) -> Result<Value>;
}

/// HTTP transport for a model invocation endpoint with secure token
/// handling.
pub struct HttpTransport {
    endpoint: String,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpTransport {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let endpoint = Self::validate_endpoint(&config.endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone().map(SecretString::from),
            client,
        })
    }

    /// Validate endpoint URL for security (SSRF prevention)
    ///
    /// Only allows http/https schemes and warns for non-localhost endpoints.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            PipelineError::config(format!("Invalid model endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PipelineError::config(format!(
                "Model endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "::1")
            && url.scheme() == "http"
        {
            warn!(
                "Model endpoint uses plain http to a remote host: {}. Ensure this is intentional.",
                host
            );
        }

        // Remove trailing slash for consistency
        let mut result = url.to_string();
        if result.ends_with('/') {
            result.pop();
        }
        Ok(result)
    }
}

#[async_trait]
impl ModelTransport for HttpTransport {
    async fn send(&self, model_id: &str, body: Value) -> Result<Value> {
        let url = format!("{}/model/{}/invoke", self.endpoint, model_id);

        debug!("Sending invocation request to {}", url);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                PipelineError::upstream(format!(
                    "Failed to connect to model endpoint at {}",
                    self.endpoint
                ))
            } else {
                PipelineError::upstream(format!("Model request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::upstream(format!(
                "Model endpoint error ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PipelineError::malformed(format!("Response body is not JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_endpoint(endpoint: &str) -> ModelConfig {
        ModelConfig {
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_endpoint_accepted() {
        let transport = HttpTransport::new(&config_with_endpoint("http://localhost:8080")).unwrap();
        assert_eq!(transport.endpoint, "http://localhost:8080");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let transport =
            HttpTransport::new(&config_with_endpoint("https://models.internal/")).unwrap();
        assert_eq!(transport.endpoint, "https://models.internal");
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = HttpTransport::new(&config_with_endpoint("ftp://models.internal")).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_garbage_endpoint_rejected() {
        assert!(HttpTransport::new(&config_with_endpoint("not a url")).is_err());
    }
}
