//! Filesystem Blob Store
//!
//! Local implementation of the store gateway. Keys map to paths under a
//! configured root; the layout on disk is exactly the key convention,
//! so a run against a synced copy of the shared store behaves like the
//! deployed pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::{BlobStore, ObjectInfo, Row, rows_from_jsonl, rows_to_jsonl};
use crate::types::{PipelineError, Result};

pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a key to a path under the root, rejecting traversal.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(PipelineError::store(format!("invalid store key: {}", key)));
        }
        Ok(self.root.join(rel))
    }

    fn collect(&self, dir: &Path, prefix: &str, out: &mut Vec<ObjectInfo>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                self.collect(&path, prefix, out)?;
                continue;
            }

            let key = path
                .strip_prefix(&self.root)
                .map_err(|e| PipelineError::store(e.to_string()))?
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect::<Vec<_>>()
                .join("/");

            if !key.starts_with(prefix) {
                continue;
            }

            let modified = entry.metadata()?.modified()?;
            out.push(ObjectInfo {
                key,
                last_modified: DateTime::<Utc>::from(modified),
            });
        }
        Ok(())
    }

    fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        debug!("Wrote {} bytes to {}", bytes.len(), key);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut out = Vec::new();
        if self.root.exists() {
            let root = self.root.clone();
            self.collect(&root, prefix, &mut out)?;
        }
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }

    async fn read_rows(&self, key: &str) -> Result<Vec<Row>> {
        rows_from_jsonl(&self.read_text(key).await?)
    }

    async fn read_text(&self, key: &str) -> Result<String> {
        let path = self.path_for(key)?;
        std::fs::read_to_string(&path)
            .map_err(|e| PipelineError::store(format!("read {}: {}", key, e)))
    }

    async fn write_rows(&self, rows: &[Row], key: &str) -> Result<()> {
        self.write_bytes(key, rows_to_jsonl(rows)?.as_bytes())
    }

    async fn write_text(&self, text: &str, key: &str) -> Result<()> {
        self.write_bytes(key, text.as_bytes())
    }

    async fn write_json(&self, value: &Value, key: &str) -> Result<()> {
        self.write_bytes(key, serde_json::to_string_pretty(value)?.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_list_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        store
            .write_text("hello", "ingest/2026/08/07/posts.txt")
            .await
            .unwrap();
        store.write_text("other", "reports/r.txt").await.unwrap();

        let listed = store.list("ingest/").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, "ingest/2026/08/07/posts.txt");

        let text = store.read_text("ingest/2026/08/07/posts.txt").await.unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let mut row = Row::new();
        row.insert("Title".to_string(), Value::String("t".to_string()));
        store.write_rows(&[row.clone()], "ingest/posts.jsonl").await.unwrap();

        let rows = store.read_rows("ingest/posts.jsonl").await.unwrap();
        assert_eq!(rows, vec![row]);
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let store = FsBlobStore::new("/nonexistent/feedpulse-test-root");
        assert!(store.list("ingest/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_traversal_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(store.write_text("x", "../escape.txt").await.is_err());
        assert!(store.read_text("/etc/passwd").await.is_err());
    }
}
