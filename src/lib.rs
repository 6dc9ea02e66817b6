//! FeedPulse - Scheduled Social-Feed Digest Pipeline
//!
//! The classification-and-summarization core of a scheduled pipeline:
//! discover unprocessed inputs in a shared blob store, fan text out to
//! a model-backed classifier/summarizer with per-family request
//! adaptation and response-parsing fallbacks, aggregate per-item
//! results into corpus-level statistics, and persist one run report
//! per invocation.
//!
//! ## Core Properties
//!
//! - **Partial-failure isolation**: one bad item never aborts a run
//! - **Degrading parsers**: structured decode falls back to heuristics,
//!   never to an error
//! - **Single documented default** model family for unknown identifiers
//! - **Stateless invocations**: idempotency comes from overwriting
//!   timestamp-qualified store keys, not from local state
//!
//! ## Modules
//!
//! - [`model`]: model-family registry, request/response adaptation, transport
//! - [`parse`]: structured extraction with heuristic fallbacks
//! - [`classify`]: per-item category and sentiment classification
//! - [`aggregate`]: corpus-level statistics and consolidated summarization
//! - [`store`]: blob-store gateway (trait + fs/memory implementations)
//! - [`pipeline`]: per-invocation run loops and entrypoint contract
//! - [`config`]: figment-merged configuration, built once per invocation

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod constants;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod store;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{PipelineError, Result};

// Domain
pub use types::report::{
    AggregateSentimentReport, CategoryResult, RunReport, SentimentLabel, SentimentResult,
    SummaryResult, TextUnit,
};

// =============================================================================
// Component Re-exports
// =============================================================================

pub use aggregate::{Summarizer, aggregate as aggregate_sentiment};
pub use classify::{ItemClassifier, SentimentCategorizer};
pub use model::{HttpTransport, InvokeOptions, ModelAdapter, ModelFamily, ModelTransport};
pub use pipeline::{HandlerResponse, run_classification, run_digest};
pub use prompt::PromptRenderer;
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore, ObjectInfo};
