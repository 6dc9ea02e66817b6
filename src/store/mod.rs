//! Store Gateway
//!
//! Boundary to the shared blob store the pipeline stages communicate
//! through. The trait is the collaborator seam; authentication and the
//! remote object store itself live outside this crate. Ships a
//! filesystem implementation for local parity and an in-memory
//! implementation used as an injected test double.
//!
//! ## Key Conventions
//!
//! - `ingest/`: raw feed blobs, date-partitioned by the fetch stage
//! - `classified/`: per-file classification outputs, timestamp-qualified
//! - `reports/YYYY/MM/DD/`: run reports, partitioned by date and time
//! - `digest/latest.txt`: well-known key the notifier reads

mod fs;
mod memory;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

use crate::types::Result;

/// One loosely-typed tabular row. Column handling degrades gracefully,
/// so rows stay schemaless at this boundary.
pub type Row = serde_json::Map<String, Value>;

/// Listing entry. Carries the modification time because discovery is
/// time-windowed and sentiment results record source metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// Blob store operations the core calls. Tabular blobs are JSON lines,
/// one object per row.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// List objects under `prefix`, sorted by key.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>>;

    async fn read_rows(&self, key: &str) -> Result<Vec<Row>>;

    async fn read_text(&self, key: &str) -> Result<String>;

    async fn write_rows(&self, rows: &[Row], key: &str) -> Result<()>;

    async fn write_text(&self, text: &str, key: &str) -> Result<()>;

    async fn write_json(&self, value: &Value, key: &str) -> Result<()>;
}

/// Shared store handle injected into the run loops.
pub type SharedStore = Arc<dyn BlobStore>;

// =============================================================================
// Key Construction
// =============================================================================

pub mod keys {
    use chrono::{DateTime, Utc};
    use std::path::Path;

    /// Timestamp-qualified key for one source file's classification
    /// output: `<prefix><source stem>_<YYYYmmddHHMMSS>.jsonl`
    pub fn classified_key(prefix: &str, source_key: &str, now: DateTime<Utc>) -> String {
        let stem = Path::new(source_key)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("input");
        format!("{}{}_{}.jsonl", prefix, stem, now.format("%Y%m%d%H%M%S"))
    }

    /// Date/time-partitioned key for one run report:
    /// `<prefix>YYYY/MM/DD/run-HHMMSS.json`
    pub fn report_key(prefix: &str, now: DateTime<Utc>) -> String {
        format!("{}{}", prefix, now.format("%Y/%m/%d/run-%H%M%S.json"))
    }

}

// =============================================================================
// Row Codec (shared by implementations)
// =============================================================================

pub(crate) fn rows_to_jsonl(rows: &[Row]) -> Result<String> {
    let mut out = String::new();
    for row in rows {
        out.push_str(&serde_json::to_string(row)?);
        out.push('\n');
    }
    Ok(out)
}

pub(crate) fn rows_from_jsonl(text: &str) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)?;
        match value {
            Value::Object(map) => rows.push(map),
            other => {
                return Err(crate::types::PipelineError::store(format!(
                    "tabular blob line is not an object: {}",
                    other
                )));
            }
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod codec_tests {
    use super::*;

    #[test]
    fn test_rows_round_trip() {
        let mut row = Row::new();
        row.insert("Title".to_string(), Value::String("hello".to_string()));
        row.insert("score".to_string(), Value::from(42));

        let text = rows_to_jsonl(&[row.clone()]).unwrap();
        let back = rows_from_jsonl(&text).unwrap();
        assert_eq!(back, vec![row]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let rows = rows_from_jsonl("\n{\"a\": 1}\n\n{\"b\": 2}\n").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_non_object_line_rejected() {
        assert!(rows_from_jsonl("[1, 2, 3]").is_err());
    }
}
