//! Unified Error Type System
//!
//! Centralized error types for the entire pipeline.
//!
//! ## Error Taxonomy
//!
//! - **Config**: required setting absent; fatal, aborts the invocation
//! - **Upstream**: the model or store call itself failed
//! - **MalformedResponse**: the call succeeded but the payload cannot be
//!   unwrapped (empty content block, missing generation field)
//! - **Store**: blob gateway failure outside a model call
//! - **PromptNotFound**: template resolution exhausted every candidate path
//!
//! Parse degradation is deliberately NOT an error: the response parsers
//! always produce a well-formed result and log the fallback instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Precondition Errors (fatal for the whole invocation)
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    /// The remote model or store call raised. Per-item occurrences are
    /// caught and skip that item; the consolidated summarization call
    /// degrades to a placeholder instead of propagating.
    #[error("Upstream call failed: {0}")]
    Upstream(String),

    /// The upstream call succeeded but returned a shape the adapter
    /// cannot unwrap. Propagated identically to Upstream.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Store error: {0}")]
    Store(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Prompt template '{name}' not found. Tried paths: {tried:?}")]
    PromptNotFound { name: String, tried: Vec<PathBuf> },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl PipelineError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an upstream error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Create a malformed-response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Precondition errors abort the whole invocation; everything else
    /// is isolated per item or degraded in place.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_fatal() {
        assert!(PipelineError::config("bucket not set").is_fatal());
        assert!(!PipelineError::upstream("model raised").is_fatal());
        assert!(!PipelineError::malformed("empty content").is_fatal());
        assert!(!PipelineError::store("put failed").is_fatal());
    }

    #[test]
    fn test_prompt_not_found_lists_paths() {
        let err = PipelineError::PromptNotFound {
            name: "classify_post.tmpl".to_string(),
            tried: vec![PathBuf::from("prompts/classify_post.tmpl")],
        };
        let msg = err.to_string();
        assert!(msg.contains("classify_post.tmpl"));
        assert!(msg.contains("prompts/classify_post.tmpl"));
    }
}
