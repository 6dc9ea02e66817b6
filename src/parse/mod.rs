//! Response Parsers
//!
//! Extracts structured fields from raw model output. All three parsers
//! share the same pattern: locate the JSON window, attempt a structured
//! decode, degrade to a heuristic when decoding fails. The sentiment and
//! summary parsers never fail outward; the caller always receives a
//! well-formed result. Degradation is logged, not raised.

use serde_json::Value;
use tracing::warn;

use crate::constants::sentiment as sentiment_constants;
use crate::types::SummaryResult;

// =============================================================================
// Sentiment Parse
// =============================================================================

/// Sentiment fields extracted from one model response. Source metadata
/// is attached later by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentParse {
    /// Uppercase label
    pub sentiment: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// Parse a sentiment response, falling back to keyword sniffing over a
/// fixed vocabulary when structured decode fails.
pub fn parse_sentiment(raw: &str) -> SentimentParse {
    if let Some(window) = brace_window(raw)
        && let Ok(value) = serde_json::from_str::<Value>(window)
    {
        let sentiment = value
            .get("sentiment")
            .and_then(Value::as_str)
            .unwrap_or("NEUTRAL")
            .to_uppercase();
        let confidence = value
            .get("confidence")
            .and_then(coerce_confidence)
            .unwrap_or(sentiment_constants::FALLBACK_NEUTRAL_CONFIDENCE);
        let reasoning = value
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or("No reasoning provided")
            .to_string();

        return SentimentParse {
            sentiment,
            confidence,
            reasoning,
        };
    }

    warn!("Structured sentiment decode failed, using keyword fallback");
    keyword_fallback(raw)
}

/// Keyword sniffing over a fixed vocabulary with fixed per-branch
/// confidence values.
fn keyword_fallback(raw: &str) -> SentimentParse {
    let lower = raw.to_lowercase();

    let (sentiment, confidence) = if ["positive", "good", "great", "excellent", "happy"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        ("POSITIVE", sentiment_constants::FALLBACK_POSITIVE_CONFIDENCE)
    } else if ["negative", "bad", "poor", "terrible", "sad"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        ("NEGATIVE", sentiment_constants::FALLBACK_NEGATIVE_CONFIDENCE)
    } else if ["mixed", "both", "conflicting"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        ("MIXED", sentiment_constants::FALLBACK_MIXED_CONFIDENCE)
    } else {
        ("NEUTRAL", sentiment_constants::FALLBACK_NEUTRAL_CONFIDENCE)
    };

    SentimentParse {
        sentiment: sentiment.to_string(),
        confidence,
        reasoning: "Keyword-based fallback; structured output could not be decoded".to_string(),
    }
}

/// Confidence may arrive as a number or a numeric string.
fn coerce_confidence(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .map(|c: f64| c.clamp(0.0, 1.0))
}

// =============================================================================
// Summary Parse
// =============================================================================

/// Parse a summarization response, back-filling any missing field with
/// a safe default. On decode failure the entire raw text becomes the
/// summary.
pub fn parse_summary(raw: &str, total_texts: usize, sample_size: usize) -> SummaryResult {
    if let Some(window) = brace_window(raw)
        && let Ok(value) = serde_json::from_str::<Value>(window)
    {
        return SummaryResult {
            summary: value
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_else(|| raw.trim())
                .to_string(),
            main_themes: string_list(&value, "main_themes"),
            key_insights: string_list(&value, "key_insights"),
            overall_tone: value
                .get("overall_tone")
                .and_then(Value::as_str)
                .unwrap_or("Not specified")
                .to_string(),
            total_texts_summarized: total_texts,
            sample_size,
        };
    }

    warn!("Structured summary decode failed, using raw text as summary");
    SummaryResult {
        summary: raw.trim().to_string(),
        main_themes: Vec::new(),
        key_insights: Vec::new(),
        overall_tone: "Not specified".to_string(),
        total_texts_summarized: total_texts,
        sample_size,
    }
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// Category Parse
// =============================================================================

/// Parse a single-label classification response. Attempts a direct
/// structured decode of the trimmed output; on failure takes the first
/// line verbatim as the label. No keyword sniffing on this path.
pub fn parse_category(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return value
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
    }

    trimmed.lines().next().unwrap_or("").trim().to_string()
}

// =============================================================================
// JSON Window
// =============================================================================

/// The substring between the first `{` and the last `}`, when both
/// exist in order.
fn brace_window(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}
