//! In-Memory Blob Store
//!
//! Test double for the store gateway. Objects live in a sorted map;
//! modification times are settable so discovery-window behavior can be
//! exercised, and writes can be made to fail to drive the
//! persistence-error path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{BlobStore, ObjectInfo, Row, rows_from_jsonl, rows_to_jsonl};
use crate::types::{PipelineError, Result};

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<BTreeMap<String, (String, DateTime<Utc>)>>,
    fail_writes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object with an explicit modification time.
    pub fn put_with_mtime(&self, key: &str, text: &str, mtime: DateTime<Utc>) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (text.to_string(), mtime));
    }

    /// Make every subsequent write fail with a store error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn get_text(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(text, _)| text.clone())
    }

    /// Keys currently stored under `prefix`, sorted.
    pub fn keys_under(&self, prefix: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn put(&self, key: &str, text: String) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PipelineError::store(format!("write refused: {}", key)));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (text, Utc::now()));
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, (_, mtime))| ObjectInfo {
                key: key.clone(),
                last_modified: *mtime,
            })
            .collect())
    }

    async fn read_rows(&self, key: &str) -> Result<Vec<Row>> {
        rows_from_jsonl(&self.read_text(key).await?)
    }

    async fn read_text(&self, key: &str) -> Result<String> {
        self.get_text(key)
            .ok_or_else(|| PipelineError::store(format!("no such key: {}", key)))
    }

    async fn write_rows(&self, rows: &[Row], key: &str) -> Result<()> {
        self.put(key, rows_to_jsonl(rows)?)
    }

    async fn write_text(&self, text: &str, key: &str) -> Result<()> {
        self.put(key, text.to_string())
    }

    async fn write_json(&self, value: &Value, key: &str) -> Result<()> {
        self.put(key, serde_json::to_string_pretty(value)?)
    }
}
