//! Model Adapter
//!
//! Normalizes request/response shape across three model families behind
//! one invocation call. Dispatch is a small registry mapping model-id
//! prefixes to a family; the request builder and response unwrapper
//! travel together on the family variant.
//!
//! Unknown prefixes fall back to ONE documented default family
//! ([`DEFAULT_FAMILY`]) at every call site.

mod family;
mod transport;

pub use family::{InvokeOptions, ModelFamily};
pub use transport::{HttpTransport, ModelTransport};

use std::sync::Arc;
use tracing::debug;

use crate::config::ModelConfig;
use crate::types::Result;

// =============================================================================
// Family Registry
// =============================================================================

/// Model-id prefix patterns and the family each dispatches to.
const FAMILY_REGISTRY: [(&str, ModelFamily); 3] = [
    ("anthropic.claude", ModelFamily::Chat),
    ("meta.llama", ModelFamily::Completion),
    ("amazon.titan", ModelFamily::SingleShot),
];

/// Family used for any model id no registry prefix matches.
pub const DEFAULT_FAMILY: ModelFamily = ModelFamily::Completion;

/// Resolve a model id to its family via the prefix registry.
pub fn resolve_family(model_id: &str) -> ModelFamily {
    FAMILY_REGISTRY
        .iter()
        .find(|(prefix, _)| model_id.starts_with(prefix))
        .map(|(_, family)| *family)
        .unwrap_or(DEFAULT_FAMILY)
}

// =============================================================================
// Model Adapter
// =============================================================================

/// Shared transport type injected into the adapter.
pub type SharedTransport = Arc<dyn ModelTransport>;

/// One invocation call over any registered family.
pub struct ModelAdapter {
    transport: SharedTransport,
}

impl ModelAdapter {
    pub fn new(transport: SharedTransport) -> Self {
        Self { transport }
    }

    /// Build an adapter backed by the HTTP transport.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Invoke `model_id` with `prompt` and return the raw output text.
    ///
    /// Fails with `Upstream` when the remote call raises and with
    /// `MalformedResponse` when the family unwrapper finds no text.
    pub async fn invoke(
        &self,
        prompt: &str,
        model_id: &str,
        opts: &InvokeOptions,
    ) -> Result<String> {
        let family = resolve_family(model_id);
        debug!(
            "Invoking model {} via {} family ({} prompt chars)",
            model_id,
            family.name(),
            prompt.len()
        );

        let body = family.build_request(prompt, opts);
        let response = self.transport.send(model_id, body).await?;
        family.unwrap_response(&response)
    }
}
