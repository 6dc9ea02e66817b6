//! Digest Run
//!
//! The sentiment-and-summary state machine, one invocation per run:
//! discover → empty-check → per-item categorize → aggregate →
//! summarize → persist. One bad item never aborts the run; each item's
//! fate is an explicit [`ItemOutcome`] value.

use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, warn};

use super::{extract_text_units, within_window};
use crate::aggregate::{Summarizer, aggregate, degraded_summary};
use crate::classify::SentimentCategorizer;
use crate::config::Config;
use crate::model::ModelAdapter;
use crate::prompt::PromptRenderer;
use crate::store::{BlobStore, keys};
use crate::types::{ModelsUsed, Result, RunReport, SentimentResult, SummaryResult};

/// Explicit per-item outcome. Skips are collected, not swallowed; the
/// skip path is a visible, tested branch.
#[derive(Debug)]
pub enum ItemOutcome {
    Categorized {
        result: SentimentResult,
        /// Combined text, kept for the consolidated summarization sample
        text: String,
    },
    Skipped {
        id: String,
        reason: String,
    },
}

/// Run the digest stage once, producing exactly one [`RunReport`].
///
/// Returns an error only for preconditions and discovery failure.
/// Per-item model failures skip the item, a summarization failure
/// degrades the summary in place, and a persistence failure is appended
/// to the report rather than raised.
pub async fn run_digest(
    config: &Config,
    store: &dyn BlobStore,
    adapter: &ModelAdapter,
) -> Result<RunReport> {
    let now = Utc::now();
    let renderer = PromptRenderer::new(&config.prompts);
    let categorizer =
        SentimentCategorizer::new(adapter, &renderer, &config.prompts.sentiment_template);

    let models = ModelsUsed {
        sentiment_model: config.models.sentiment_model.clone(),
        summary_model: config.models.summary_model.clone(),
    };

    // 1. Discover
    let objects = store.list(&config.store.ingest_prefix).await?;
    let eligible = within_window(objects, now, config.discovery.window_days);

    // 2. Empty-check: not an error
    if eligible.is_empty() {
        info!("No eligible inputs within the last {} days", config.discovery.window_days);
        return Ok(RunReport {
            timestamp: now,
            models,
            sentiment: aggregate(&[]),
            summarization: empty_summary(),
            report_key: None,
            persist_error: None,
        });
    }

    // 3. Per-item categorize with explicit outcomes
    let mut outcomes: Vec<ItemOutcome> = Vec::new();
    for object in &eligible {
        let rows = match store.read_rows(&object.key).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Skipping file {}: {}", object.key, e);
                outcomes.push(ItemOutcome::Skipped {
                    id: object.key.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        for unit in extract_text_units(&object.key, &rows) {
            match categorizer
                .categorize(&unit.text, &config.models.sentiment_model)
                .await
            {
                Ok(parsed) => outcomes.push(ItemOutcome::Categorized {
                    result: SentimentResult {
                        sentiment: parsed.sentiment,
                        confidence: parsed.confidence,
                        reasoning: parsed.reasoning,
                        source_key: object.key.clone(),
                        last_modified: object.last_modified,
                    },
                    text: unit.text,
                }),
                Err(e) => {
                    warn!("Skipping item {}: {}", unit.id(), e);
                    outcomes.push(ItemOutcome::Skipped {
                        id: unit.id(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    let mut results = Vec::new();
    let mut texts = Vec::new();
    let mut skipped = 0usize;
    for outcome in outcomes {
        match outcome {
            ItemOutcome::Categorized { result, text } => {
                results.push(result);
                texts.push(text);
            }
            ItemOutcome::Skipped { .. } => skipped += 1,
        }
    }
    info!(
        "Categorized {} items ({} skipped) from {} files",
        results.len(),
        skipped,
        eligible.len()
    );

    // 4. Aggregate
    let sentiment = aggregate(&results);

    // 5. Summarize, degrading in place on failure
    let summarization = if texts.is_empty() {
        empty_summary()
    } else {
        let summarizer = Summarizer::new(adapter, &renderer, &config.prompts.summarize_template);
        match summarizer.summarize(&texts, &config.models.summary_model).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Summarization failed, substituting degraded summary: {}", e);
                degraded_summary(&e, texts.len())
            }
        }
    };

    let mut report = RunReport {
        timestamp: now,
        models,
        sentiment,
        summarization,
        report_key: None,
        persist_error: None,
    };

    // 6. Persist; failure is appended, not raised
    let report_key = keys::report_key(&config.store.reports_prefix, now);
    match persist(config, store, &report, &report_key).await {
        Ok(()) => {
            info!("Run report written to {}", report_key);
            report.report_key = Some(report_key);
        }
        Err(e) => {
            error!("Failed to persist run report: {}", e);
            report.persist_error = Some(e.to_string());
        }
    }

    Ok(report)
}

/// Write the report JSON and the digest text the notifier picks up.
async fn persist(
    config: &Config,
    store: &dyn BlobStore,
    report: &RunReport,
    report_key: &str,
) -> Result<()> {
    store
        .write_json(&serde_json::to_value(report)?, report_key)
        .await?;
    store
        .write_text(&render_digest_text(report), &config.store.digest_key)
        .await
}

fn empty_summary() -> SummaryResult {
    SummaryResult {
        summary: "No texts to summarize".to_string(),
        main_themes: Vec::new(),
        key_insights: Vec::new(),
        overall_tone: "Not specified".to_string(),
        total_texts_summarized: 0,
        sample_size: 0,
    }
}

// =============================================================================
// Digest Text
// =============================================================================

/// Plain-text digest written under the well-known notifier key.
pub fn render_digest_text(report: &RunReport) -> String {
    let s = &report.sentiment;
    let mut text = format!(
        "Feed digest for {}\n\nOverall sentiment: {} (avg confidence {:.2})\n\
         Positive {} ({:.2}%) | Negative {} ({:.2}%) | Neutral {} ({:.2}%) | Mixed {} ({:.2}%)\n\n{}\n",
        report.timestamp.format("%Y-%m-%d %H:%M UTC"),
        s.overall_sentiment,
        s.average_confidence,
        s.distribution.positive,
        s.percentages.positive,
        s.distribution.negative,
        s.percentages.negative,
        s.distribution.neutral,
        s.percentages.neutral,
        s.distribution.mixed,
        s.percentages.mixed,
        report.summarization.summary,
    );

    if !report.summarization.main_themes.is_empty() {
        text.push_str(&format!(
            "\nThemes: {}\n",
            report.summarization.main_themes.join(", ")
        ));
    }
    if !report.summarization.key_insights.is_empty() {
        text.push_str("\nKey insights:\n");
        for insight in &report.summarization.key_insights {
            text.push_str(&format!("  - {}\n", insight));
        }
    }
    text.push_str(&format!("\nTone: {}\n", report.summarization.overall_tone));

    text
}

// =============================================================================
// Entrypoint
// =============================================================================

/// Invocation entrypoint for the digest stage. The event is opaque; it
/// is logged and otherwise ignored.
pub async fn handle_digest(
    config: &Config,
    store: &dyn BlobStore,
    adapter: &ModelAdapter,
    event: &Value,
) -> super::HandlerResponse {
    info!("Event received: {}", event);

    match run_digest(config, store, adapter).await {
        Ok(report) => {
            let body = serde_json::json!({
                "total_texts_analyzed": report.sentiment.total_texts_analyzed,
                "overall_sentiment": report.sentiment.overall_sentiment,
                "report_key": report.report_key,
                "persist_error": report.persist_error,
                "report": report,
            });
            super::HandlerResponse::success(body)
        }
        Err(e) => super::HandlerResponse::failure(&e),
    }
}
