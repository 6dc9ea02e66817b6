//! Orchestration Layer
//!
//! Per-invocation batch runs over the store gateway. Two runs share the
//! same discovery and text-unit extraction:
//!
//! - [`classify_run`]: per-file category classification of raw inputs
//! - [`digest`]: sentiment categorization + consolidated summarization
//!   ending in one persisted run report
//!
//! Both are single-threaded, run-to-completion, and stateless apart
//! from what they read fresh from the store.

pub mod classify_run;
pub mod digest;

pub use classify_run::{ClassificationReport, handle_classification, run_classification};
pub use digest::{ItemOutcome, handle_digest, render_digest_text, run_digest};

use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};

use crate::constants::text as text_constants;
use crate::store::{ObjectInfo, Row};
use crate::types::{PipelineError, TextUnit};

// =============================================================================
// Discovery Window
// =============================================================================

/// Keep objects modified within the trailing eligibility window.
pub(crate) fn within_window(
    objects: Vec<ObjectInfo>,
    now: DateTime<Utc>,
    window_days: i64,
) -> Vec<ObjectInfo> {
    let cutoff = now - Duration::days(window_days);
    objects
        .into_iter()
        .filter(|obj| obj.last_modified >= cutoff)
        .collect()
}

// =============================================================================
// Text-Unit Extraction
// =============================================================================

/// Extract text units from tabular rows.
///
/// Recognized text columns are combined in a fixed order, blank-filled
/// and ". "-joined. Rows lacking every recognized column and rows whose
/// combined text is empty are excluded before classification.
pub fn extract_text_units(source_key: &str, rows: &[Row]) -> Vec<TextUnit> {
    rows.iter()
        .enumerate()
        .filter_map(|(row_index, row)| {
            let mut saw_column = false;
            let mut parts: Vec<&str> = Vec::new();

            for column in text_constants::TEXT_COLUMNS {
                if let Some(value) = row.get(column) {
                    saw_column = true;
                    if let Some(text) = value.as_str() {
                        let text = text.trim();
                        if !text.is_empty() {
                            parts.push(text);
                        }
                    }
                }
            }

            if !saw_column || parts.is_empty() {
                return None;
            }

            Some(TextUnit {
                source_key: source_key.to_string(),
                row_index: Some(row_index),
                text: parts.join(text_constants::COLUMN_JOIN),
                prior_category: row
                    .get("category")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

// =============================================================================
// Invocation Entrypoint Contract
// =============================================================================

/// Status code plus JSON body, the shape every entrypoint returns.
/// The body always carries `status` and `timestamp`; a success body can
/// still carry an embedded persistence-error field.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: Value,
}

impl HandlerResponse {
    pub fn success(mut body: Value) -> Self {
        if let Some(map) = body.as_object_mut() {
            map.insert("status".to_string(), json!("success"));
            map.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
        }
        Self {
            status_code: 200,
            body,
        }
    }

    pub fn failure(error: &PipelineError) -> Self {
        Self {
            status_code: 500,
            body: json!({
                "status": "error",
                "message": error.to_string(),
                "timestamp": Utc::now().to_rfc3339(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_extract_combines_text_columns_in_order() {
        let rows = vec![row(&[
            ("Post_Text", json!("the body")),
            ("Title", json!("the title")),
        ])];
        let units = extract_text_units("ingest/a.jsonl", &rows);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "the title. the body");
        assert_eq!(units[0].row_index, Some(0));
    }

    #[test]
    fn test_extract_blank_fills_missing_values() {
        let rows = vec![row(&[("Title", json!("only title")), ("Post_Text", json!(null))])];
        let units = extract_text_units("ingest/a.jsonl", &rows);
        assert_eq!(units[0].text, "only title");
    }

    #[test]
    fn test_extract_skips_rows_without_recognized_columns() {
        let rows = vec![row(&[("score", json!(10)), ("url", json!("http://x"))])];
        assert!(extract_text_units("ingest/a.jsonl", &rows).is_empty());
    }

    #[test]
    fn test_extract_skips_empty_combined_text() {
        let rows = vec![row(&[("Title", json!("  ")), ("Body", json!(""))])];
        assert!(extract_text_units("ingest/a.jsonl", &rows).is_empty());
    }

    #[test]
    fn test_extract_carries_prior_category() {
        let rows = vec![row(&[
            ("Title", json!("t")),
            ("category", json!("Housing")),
        ])];
        let units = extract_text_units("ingest/a.jsonl", &rows);
        assert_eq!(units[0].prior_category.as_deref(), Some("Housing"));
    }

    #[test]
    fn test_within_window_filters_old_objects() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let fresh = ObjectInfo {
            key: "ingest/fresh.jsonl".to_string(),
            last_modified: now - Duration::days(2),
        };
        let stale = ObjectInfo {
            key: "ingest/stale.jsonl".to_string(),
            last_modified: now - Duration::days(9),
        };

        let kept = within_window(vec![fresh.clone(), stale], now, 7);
        assert_eq!(kept, vec![fresh]);
    }

    #[test]
    fn test_handler_response_shapes() {
        let ok = HandlerResponse::success(json!({"processed_files": 2}));
        assert_eq!(ok.status_code, 200);
        assert_eq!(ok.body["status"], "success");
        assert!(ok.body["timestamp"].is_string());

        let err = HandlerResponse::failure(&PipelineError::config("store.root missing"));
        assert_eq!(err.status_code, 500);
        assert_eq!(err.body["status"], "error");
        assert!(err.body["message"].as_str().unwrap().contains("store.root"));
    }
}
