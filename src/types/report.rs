//! Pipeline Domain Types
//!
//! Entities produced by one run of the pipeline. Everything here is
//! created fresh per invocation from store contents and discarded after
//! the run report is persisted; nothing is mutated after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Sentiment Label
// =============================================================================

/// The four sentiment labels, in the fixed enumeration order used for
/// tie-breaking the overall label (first max-count label wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl SentimentLabel {
    pub const ORDERED: [SentimentLabel; 4] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Mixed,
    ];

    /// Parse a raw label. Matching is case-insensitive; anything
    /// unrecognized counts as NEUTRAL.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "POSITIVE" => Self::Positive,
            "NEGATIVE" => Self::Negative,
            "MIXED" => Self::Mixed,
            _ => Self::Neutral,
        }
    }

    /// Uppercase wire form used for counting
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
            Self::Mixed => "MIXED",
        }
    }

    /// Title-case display form used in reports
    pub fn display(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Per-Item Results
// =============================================================================

/// One classifiable piece of input text derived from a source row.
/// Immutable once extracted for the run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextUnit {
    /// Store key of the blob this unit came from
    pub source_key: String,
    /// Row index within the blob, when the source is tabular
    pub row_index: Option<usize>,
    /// Combined text (recognized text fields, blank-filled, ". "-joined)
    pub text: String,
    /// Classification carried over from a previous stage, if any
    pub prior_category: Option<String>,
}

impl TextUnit {
    pub fn id(&self) -> String {
        match self.row_index {
            Some(idx) => format!("{}#{}", self.source_key, idx),
            None => self.source_key.clone(),
        }
    }
}

/// Category assignment for one text unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub source_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
    pub category: String,
    pub combined_text: String,
}

/// Sentiment assignment for one text unit, with source metadata
/// attached by the caller after categorization returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Uppercase wire form ("POSITIVE", ...)
    pub sentiment: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub reasoning: String,
    pub source_key: String,
    pub last_modified: DateTime<Utc>,
}

impl SentimentResult {
    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::parse(&self.sentiment)
    }
}

// =============================================================================
// Batch Results
// =============================================================================

/// One consolidated summary per batch (not per item).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub main_themes: Vec<String>,
    pub key_insights: Vec<String>,
    pub overall_tone: String,
    /// True number of texts offered to the summarizer
    pub total_texts_summarized: usize,
    /// Number of texts that actually made it into the capped prompt
    pub sample_size: usize,
}

/// Distribution counts. Always sums to the number of successfully
/// classified items; failed items are excluded, not zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub mixed: usize,
}

impl SentimentDistribution {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral + self.mixed
    }

    pub fn count(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Mixed => self.mixed,
        }
    }

    pub fn bump(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Mixed => self.mixed += 1,
        }
    }
}

/// Percentages rounded to 2 decimals; all 0 when the batch is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentPercentages {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub mixed: f64,
}

/// Corpus-level sentiment statistics, derived deterministically from a
/// list of per-item results. Always embedded in a run report, never
/// persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSentimentReport {
    /// Display form of the overall label, or "N/A" for an empty batch
    pub overall_sentiment: String,
    pub total_texts_analyzed: usize,
    pub distribution: SentimentDistribution,
    pub percentages: SentimentPercentages,
    pub average_confidence: f64,
    /// Per-item details in discovery order
    pub details: Vec<SentimentResult>,
}

// =============================================================================
// Run Report
// =============================================================================

/// Models used by one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsUsed {
    pub sentiment_model: String,
    pub summary_model: String,
}

/// Terminal artifact of one digest invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    pub models: ModelsUsed,
    pub sentiment: AggregateSentimentReport,
    pub summarization: SummaryResult,
    /// Store key the report was written to, when persistence succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_key: Option<String>,
    /// Set when persistence failed; the invocation still succeeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse_case_insensitive() {
        assert_eq!(SentimentLabel::parse("positive"), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::parse("  Negative "), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::parse("MIXED"), SentimentLabel::Mixed);
    }

    #[test]
    fn test_label_parse_unrecognized_is_neutral() {
        assert_eq!(SentimentLabel::parse("ambivalent"), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::parse(""), SentimentLabel::Neutral);
    }

    #[test]
    fn test_label_forms() {
        assert_eq!(SentimentLabel::Positive.as_str(), "POSITIVE");
        assert_eq!(SentimentLabel::Positive.display(), "Positive");
    }

    #[test]
    fn test_distribution_total_and_bump() {
        let mut dist = SentimentDistribution::default();
        dist.bump(SentimentLabel::Positive);
        dist.bump(SentimentLabel::Positive);
        dist.bump(SentimentLabel::Mixed);
        assert_eq!(dist.total(), 3);
        assert_eq!(dist.count(SentimentLabel::Positive), 2);
        assert_eq!(dist.count(SentimentLabel::Negative), 0);
    }

    #[test]
    fn test_text_unit_id() {
        let unit = TextUnit {
            source_key: "ingest/2026/08/01/posts.jsonl".to_string(),
            row_index: Some(3),
            text: "hello".to_string(),
            prior_category: None,
        };
        assert_eq!(unit.id(), "ingest/2026/08/01/posts.jsonl#3");
    }
}
