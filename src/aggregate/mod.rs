//! Batch Aggregation
//!
//! Combines per-item sentiment results into corpus-level counts,
//! percentages, and an overall label, and consolidates many item texts
//! into a single capped summarization call.

use tracing::info;

use crate::constants::summary as summary_constants;
use crate::model::{InvokeOptions, ModelAdapter};
use crate::parse;
use crate::prompt::PromptRenderer;
use crate::types::utils::{round2, truncate_chars};
use crate::types::{
    AggregateSentimentReport, Result, SentimentDistribution, SentimentLabel, SentimentPercentages,
    SentimentResult, SummaryResult,
};

// =============================================================================
// Sentiment Aggregation
// =============================================================================

/// Aggregate per-item results deterministically.
///
/// Counts per label (unrecognized labels count as NEUTRAL via the label
/// parse), percentages guard the zero-division case, and the overall
/// label is the first label in enumeration order achieving the maximum
/// count. An empty batch yields "N/A" and all-zero statistics.
pub fn aggregate(results: &[SentimentResult]) -> AggregateSentimentReport {
    let total = results.len();

    let mut distribution = SentimentDistribution::default();
    let mut confidence_sum = 0.0;
    for result in results {
        distribution.bump(result.label());
        confidence_sum += result.confidence;
    }

    let percentages = if total == 0 {
        SentimentPercentages::default()
    } else {
        let pct = |count: usize| round2(count as f64 / total as f64 * 100.0);
        SentimentPercentages {
            positive: pct(distribution.positive),
            negative: pct(distribution.negative),
            neutral: pct(distribution.neutral),
            mixed: pct(distribution.mixed),
        }
    };

    let average_confidence = if total == 0 {
        0.0
    } else {
        round2(confidence_sum / total as f64)
    };

    let overall_sentiment = if total == 0 {
        "N/A".to_string()
    } else {
        // First max-count label in enumeration order; ties resolve by
        // that order, never by insertion order.
        let mut overall = SentimentLabel::ORDERED[0];
        for label in SentimentLabel::ORDERED {
            if distribution.count(label) > distribution.count(overall) {
                overall = label;
            }
        }
        overall.display().to_string()
    };

    AggregateSentimentReport {
        overall_sentiment,
        total_texts_analyzed: total,
        distribution,
        percentages,
        average_confidence,
        details: results.to_vec(),
    }
}

// =============================================================================
// Consolidated Summarization
// =============================================================================

/// Combines many item texts into one summarization call.
pub struct Summarizer<'a> {
    adapter: &'a ModelAdapter,
    renderer: &'a PromptRenderer,
    template: String,
}

const SUMMARY_FORMAT_INSTRUCTION: &str = "Respond with JSON format: {\"summary\": \"text\", \"main_themes\": [\"theme\"], \"key_insights\": [\"insight\"], \"overall_tone\": \"text\"}";

impl<'a> Summarizer<'a> {
    pub fn new(adapter: &'a ModelAdapter, renderer: &'a PromptRenderer, template: &str) -> Self {
        Self {
            adapter,
            renderer,
            template: template.to_string(),
        }
    }

    /// Summarize a batch of texts with one consolidated call.
    ///
    /// At most [`summary_constants::MAX_SAMPLE_ITEMS`] texts enter the
    /// prompt, each excerpt truncated to its character ceiling. The
    /// result reports the true offered count separately from the
    /// sample size actually used.
    pub async fn summarize(&self, texts: &[String], model_id: &str) -> Result<SummaryResult> {
        let total_offered = texts.len();
        let sample: Vec<String> = texts
            .iter()
            .take(summary_constants::MAX_SAMPLE_ITEMS)
            .map(|text| {
                truncate_chars(text, summary_constants::MAX_EXCERPT_CHARS, "...")
            })
            .collect();
        let sample_size = sample.len();

        if sample_size < total_offered {
            info!(
                "Summarization sample capped at {} of {} texts",
                sample_size, total_offered
            );
        }

        let joined = sample.join(summary_constants::EXCERPT_SEPARATOR);
        let rendered = self.renderer.render(&self.template, &[("posts", &joined)])?;
        let prompt = format!("{}\n\n{}", rendered, SUMMARY_FORMAT_INSTRUCTION);

        let raw = self
            .adapter
            .invoke(&prompt, model_id, &InvokeOptions::summarization())
            .await?;

        Ok(parse::parse_summary(&raw, total_offered, sample_size))
    }
}

/// Degraded summary substituted when the consolidated call itself
/// fails. States the failure in the summary field; the true offered
/// count is still reported.
pub fn degraded_summary(error: &crate::types::PipelineError, total_offered: usize) -> SummaryResult {
    SummaryResult {
        summary: format!("Summarization failed: {}", error),
        main_themes: Vec::new(),
        key_insights: Vec::new(),
        overall_tone: "Not specified".to_string(),
        total_texts_summarized: total_offered,
        sample_size: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn result(sentiment: &str, confidence: f64) -> SentimentResult {
        SentimentResult {
            sentiment: sentiment.to_string(),
            confidence,
            reasoning: "test".to_string(),
            source_key: "ingest/posts.jsonl".to_string(),
            last_modified: Utc::now(),
        }
    }

    #[test]
    fn test_empty_batch() {
        let report = aggregate(&[]);
        assert_eq!(report.overall_sentiment, "N/A");
        assert_eq!(report.total_texts_analyzed, 0);
        assert_eq!(report.distribution.total(), 0);
        assert_eq!(report.percentages, SentimentPercentages::default());
        assert_eq!(report.average_confidence, 0.0);
    }

    #[test]
    fn test_three_item_batch() {
        let report = aggregate(&[
            result("POSITIVE", 0.9),
            result("POSITIVE", 0.7),
            result("NEGATIVE", 0.6),
        ]);

        assert_eq!(report.total_texts_analyzed, 3);
        assert_eq!(report.distribution.positive, 2);
        assert_eq!(report.distribution.negative, 1);
        assert_eq!(report.distribution.neutral, 0);
        assert_eq!(report.distribution.mixed, 0);
        assert_eq!(report.percentages.positive, 66.67);
        assert_eq!(report.percentages.negative, 33.33);
        assert_eq!(report.overall_sentiment, "Positive");
        assert_eq!(report.average_confidence, 0.73);
    }

    #[test]
    fn test_single_item_confidence_exact() {
        let report = aggregate(&[result("positive", 0.83)]);
        assert_eq!(report.distribution.positive, 1);
        assert_eq!(report.average_confidence, 0.83);
    }

    #[test]
    fn test_unrecognized_label_counts_as_neutral() {
        let report = aggregate(&[result("AMBIVALENT", 0.5)]);
        assert_eq!(report.distribution.neutral, 1);
        assert_eq!(report.distribution.total(), 1);
    }

    #[test]
    fn test_tie_resolves_by_enumeration_order() {
        // NEGATIVE arrives first but POSITIVE wins the tie by order
        let report = aggregate(&[
            result("NEGATIVE", 0.8),
            result("POSITIVE", 0.8),
        ]);
        assert_eq!(report.overall_sentiment, "Positive");

        // NEUTRAL/MIXED tie resolves to NEUTRAL
        let report = aggregate(&[result("MIXED", 0.5), result("NEUTRAL", 0.5)]);
        assert_eq!(report.overall_sentiment, "Neutral");
    }

    #[test]
    fn test_degraded_summary_keeps_offered_count() {
        let err = crate::types::PipelineError::upstream("model unavailable");
        let summary = degraded_summary(&err, 17);
        assert!(summary.summary.contains("Summarization failed"));
        assert_eq!(summary.total_texts_summarized, 17);
        assert_eq!(summary.sample_size, 0);
    }

    proptest! {
        #[test]
        fn prop_distribution_sums_to_total(
            labels in proptest::collection::vec(0usize..5, 0..120),
        ) {
            let names = ["POSITIVE", "NEGATIVE", "NEUTRAL", "MIXED", "weird"];
            let results: Vec<SentimentResult> = labels
                .iter()
                .map(|&i| result(names[i], 0.5))
                .collect();

            let report = aggregate(&results);
            prop_assert_eq!(report.distribution.total(), results.len());
            prop_assert_eq!(report.total_texts_analyzed, results.len());
        }

        #[test]
        fn prop_percentages_sum_to_100(
            labels in proptest::collection::vec(0usize..4, 1..120),
        ) {
            let names = ["POSITIVE", "NEGATIVE", "NEUTRAL", "MIXED"];
            let results: Vec<SentimentResult> = labels
                .iter()
                .map(|&i| result(names[i], 0.5))
                .collect();

            let report = aggregate(&results);
            let sum = report.percentages.positive
                + report.percentages.negative
                + report.percentages.neutral
                + report.percentages.mixed;
            // within rounding of 0.01 per bucket
            prop_assert!((sum - 100.0).abs() <= 0.04, "sum was {}", sum);
        }
    }
}
