//! Configuration Types
//!
//! All configuration structures with sensible defaults. The config is
//! built once per invocation and passed to each component explicitly;
//! there is no module-level client or environment state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{discovery, network};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Blob store location and key conventions
    pub store: StoreConfig,

    /// Model identifiers and transport settings
    pub models: ModelConfig,

    /// Prompt template resolution
    pub prompts: PromptConfig,

    /// Input discovery settings
    pub discovery: DiscoveryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            store: StoreConfig::default(),
            models: ModelConfig::default(),
            prompts: PromptConfig::default(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `PipelineError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.discovery.window_days < 1 {
            return Err(crate::types::PipelineError::config(format!(
                "discovery window_days must be at least 1, got {}",
                self.discovery.window_days
            )));
        }

        if self.models.timeout_secs == 0 {
            return Err(crate::types::PipelineError::config(
                "models timeout_secs must be greater than 0".to_string(),
            ));
        }

        for (name, id) in [
            ("classify_model", &self.models.classify_model),
            ("sentiment_model", &self.models.sentiment_model),
            ("summary_model", &self.models.summary_model),
        ] {
            if id.trim().is_empty() {
                return Err(crate::types::PipelineError::config(format!(
                    "models.{} must not be empty",
                    name
                )));
            }
        }

        Ok(())
    }

    /// The store root is the one setting with no usable default; a run
    /// cannot start without it.
    pub fn require_store_root(&self) -> crate::types::Result<&PathBuf> {
        self.store.root.as_ref().ok_or_else(|| {
            crate::types::PipelineError::config(
                "store.root is not configured (set it in feedpulse.toml or FEEDPULSE_STORE_ROOT)",
            )
        })
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root location of the shared blob store
    pub root: Option<PathBuf>,

    /// Prefix raw feed blobs are written under, date-partitioned
    pub ingest_prefix: String,

    /// Prefix for per-file classification outputs
    pub classified_prefix: String,

    /// Prefix for run reports, partitioned by date and time-of-day
    pub reports_prefix: String,

    /// Well-known key the notifier reads the digest text from
    pub digest_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            ingest_prefix: "ingest/".to_string(),
            classified_prefix: "classified/".to_string(),
            reports_prefix: "reports/".to_string(),
            digest_key: "digest/latest.txt".to_string(),
        }
    }
}

// =============================================================================
// Model Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Invocation endpoint base URL
    pub endpoint: String,

    /// Model used for category classification
    pub classify_model: String,

    /// Model used for per-item sentiment categorization
    pub sentiment_model: String,

    /// Model used for the consolidated summarization call
    pub summary_model: String,

    /// Bearer token for the invocation endpoint.
    /// Never serialized to output for security.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds (transport-level; the core enforces
    /// no timeout of its own)
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            classify_model: "anthropic.claude-3-sonnet-20240229-v1:0".to_string(),
            sentiment_model: "anthropic.claude-3-sonnet-20240229-v1:0".to_string(),
            summary_model: "anthropic.claude-3-sonnet-20240229-v1:0".to_string(),
            api_key: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("endpoint", &self.endpoint)
            .field("classify_model", &self.classify_model)
            .field("sentiment_model", &self.sentiment_model)
            .field("summary_model", &self.summary_model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// =============================================================================
// Prompt Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Primary template directory
    pub templates_dir: PathBuf,

    /// Template for category classification
    pub classify_template: String,

    /// Template for sentiment categorization
    pub sentiment_template: String,

    /// Template for the consolidated summarization call
    pub summarize_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("prompts"),
            classify_template: "classify_post.tmpl".to_string(),
            sentiment_template: "sentiment.tmpl".to_string(),
            summarize_template: "summarize_posts.tmpl".to_string(),
        }
    }
}

// =============================================================================
// Discovery Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Trailing eligibility window in days
    pub window_days: i64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            window_days: discovery::DEFAULT_WINDOW_DAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        Config::default().validate().expect("defaults must validate");
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = Config::default();
        config.discovery.window_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_model_rejected() {
        let mut config = Config::default();
        config.models.sentiment_model = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_root_required() {
        let config = Config::default();
        let err = config.require_store_root().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let config = ModelConfig {
            api_key: Some("secret-token".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("REDACTED"));
    }
}
