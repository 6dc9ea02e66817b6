//! Model Families
//!
//! Three request/response shape conventions sit behind one invocation
//! call. Each family owns a request builder and a response unwrapper;
//! the pairing is what the registry in the parent module dispatches on.
//!
//! - **Chat**: versioned message envelope, single user turn
//! - **Completion**: instruction-delimited prompt with a generation cap
//! - **SingleShot**: flat input-text field plus a generation config

use serde_json::{Value, json};

use crate::constants::model as model_constants;
use crate::types::{PipelineError, Result};

/// Per-call-site generation parameters.
#[derive(Debug, Clone, Copy)]
pub struct InvokeOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl InvokeOptions {
    /// Deterministic-leaning settings for classification calls
    pub fn classification() -> Self {
        Self {
            max_tokens: model_constants::CLASSIFY_MAX_TOKENS,
            temperature: model_constants::CLASSIFY_TEMPERATURE,
            top_p: model_constants::TOP_P,
        }
    }

    /// Settings for the consolidated summarization call
    pub fn summarization() -> Self {
        Self {
            max_tokens: model_constants::SUMMARIZE_MAX_TOKENS,
            temperature: model_constants::SUMMARIZE_TEMPERATURE,
            top_p: model_constants::TOP_P,
        }
    }
}

/// Request/response shape convention for one provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Chat,
    Completion,
    SingleShot,
}

impl ModelFamily {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Completion => "completion",
            Self::SingleShot => "single-shot",
        }
    }

    /// Build the family-specific request body.
    pub fn build_request(&self, prompt: &str, opts: &InvokeOptions) -> Value {
        match self {
            Self::Chat => json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": opts.max_tokens,
                "messages": [{"role": "user", "content": prompt}],
            }),
            Self::Completion => json!({
                "prompt": format!("<s>[INST] {} [/INST]", prompt),
                "max_gen_len": opts.max_tokens,
                "temperature": opts.temperature,
                "top_p": opts.top_p,
            }),
            Self::SingleShot => json!({
                "inputText": prompt,
                "textGenerationConfig": {
                    "maxTokenCount": opts.max_tokens,
                    "temperature": opts.temperature,
                    "topP": opts.top_p,
                },
            }),
        }
    }

    /// Unwrap the family-specific response body down to raw text.
    ///
    /// Returns `MalformedResponse` when the expected field is absent
    /// (empty content array, missing generation, empty results).
    pub fn unwrap_response(&self, body: &Value) -> Result<String> {
        match self {
            Self::Chat => body
                .get("content")
                .and_then(|c| c.get(0))
                .and_then(|block| block.get("text"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    PipelineError::malformed("chat response has no content[0].text")
                }),
            Self::Completion => body
                .get("generation")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    PipelineError::malformed("completion response has no generation field")
                }),
            Self::SingleShot => body
                .get("results")
                .and_then(|r| r.get(0))
                .and_then(|first| first.get("outputText"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    PipelineError::malformed("single-shot response has no results[0].outputText")
                }),
        }
    }
}
