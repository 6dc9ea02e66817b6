//! Classification Run
//!
//! Discovers raw input blobs, classifies every text unit in each, and
//! persists one classification output blob per input file under the
//! classified prefix. A failure on one file is logged and skipped; the
//! rest of the batch continues.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use super::{extract_text_units, within_window};
use crate::classify::ItemClassifier;
use crate::config::Config;
use crate::model::ModelAdapter;
use crate::prompt::PromptRenderer;
use crate::store::{BlobStore, Row, keys};
use crate::types::Result;

/// Outcome of one classification invocation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClassificationReport {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    /// Input files that produced a classification output
    pub processed_files: usize,
    /// Keys the outputs were written under
    pub result_keys: Vec<String>,
}

/// Run the classification stage once.
///
/// Returns an error only for preconditions (configuration) and
/// discovery failure; everything per-file is isolated.
pub async fn run_classification(
    config: &Config,
    store: &dyn BlobStore,
    adapter: &ModelAdapter,
) -> Result<ClassificationReport> {
    let now = Utc::now();
    let renderer = PromptRenderer::new(&config.prompts);
    let classifier = ItemClassifier::new(adapter, &renderer);

    let objects = store.list(&config.store.ingest_prefix).await?;
    let eligible = within_window(objects, now, config.discovery.window_days);

    if eligible.is_empty() {
        info!("No eligible input files under {}", config.store.ingest_prefix);
        return Ok(ClassificationReport {
            timestamp: now,
            model: config.models.classify_model.clone(),
            processed_files: 0,
            result_keys: Vec::new(),
        });
    }

    let mut result_keys = Vec::new();
    for object in &eligible {
        match classify_file(config, store, &classifier, &object.key, now).await {
            Ok(Some(key)) => result_keys.push(key),
            Ok(None) => {} // empty file or no recognized text columns
            Err(e) => {
                warn!("Error processing file {}: {}", object.key, e);
                continue;
            }
        }
    }

    info!(
        "Classification run complete: {} of {} files produced output",
        result_keys.len(),
        eligible.len()
    );

    Ok(ClassificationReport {
        timestamp: now,
        model: config.models.classify_model.clone(),
        processed_files: result_keys.len(),
        result_keys,
    })
}

/// Classify every text unit in one input file and persist the results.
/// Returns the output key, or None when the file yields nothing.
async fn classify_file(
    config: &Config,
    store: &dyn BlobStore,
    classifier: &ItemClassifier<'_>,
    source_key: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    let rows = store.read_rows(source_key).await?;
    if rows.is_empty() {
        warn!("File {} is empty, skipping", source_key);
        return Ok(None);
    }

    let units = extract_text_units(source_key, &rows);
    if units.is_empty() {
        warn!("No text columns found in {}, skipping", source_key);
        return Ok(None);
    }

    let mut classified: Vec<Row> = Vec::with_capacity(units.len());
    for unit in &units {
        // Rows classified by an earlier run keep their label
        let result = match &unit.prior_category {
            Some(category) => crate::types::CategoryResult {
                source_key: unit.source_key.clone(),
                row_index: unit.row_index,
                category: category.clone(),
                combined_text: unit.text.clone(),
            },
            None => {
                classifier
                    .classify(
                        unit,
                        &config.models.classify_model,
                        &config.prompts.classify_template,
                    )
                    .await?
            }
        };

        if let Value::Object(map) = serde_json::to_value(&result)? {
            classified.push(map);
        }
    }

    let result_key = keys::classified_key(&config.store.classified_prefix, source_key, now);
    store.write_rows(&classified, &result_key).await?;
    info!("Wrote {} classified rows to {}", classified.len(), result_key);

    Ok(Some(result_key))
}

// =============================================================================
// Entrypoint
// =============================================================================

/// Invocation entrypoint for the classification stage. The event is
/// opaque; it is logged and otherwise ignored.
pub async fn handle_classification(
    config: &Config,
    store: &dyn BlobStore,
    adapter: &ModelAdapter,
    event: &Value,
) -> super::HandlerResponse {
    info!("Event received: {}", event);

    match run_classification(config, store, adapter).await {
        Ok(report) => {
            let body = serde_json::json!({
                "processed_files": report.processed_files,
                "result_keys": report.result_keys,
            });
            super::HandlerResponse::success(body)
        }
        Err(e) => super::HandlerResponse::failure(&e),
    }
}
