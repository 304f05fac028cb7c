//! JSON document writer
//!
//! Persists the accumulated records as one pretty-printed JSON document.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;

/// Destination for the finished record collection
#[async_trait]
pub trait RecordWriter: Send + Sync {
    /// Write `payload` to `path`
    async fn write<T>(&self, path: &Path, payload: &T) -> Result<()>
    where
        T: Serialize + Sync + ?Sized;
}

/// Writes JSON files with a two-space indent
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileWriter;

impl JsonFileWriter {
    /// Create a new writer
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RecordWriter for JsonFileWriter {
    async fn write<T>(&self, path: &Path, payload: &T) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let contents = serde_json::to_string_pretty(payload)
            .map_err(|e| Error::output(format!("Failed to serialize records: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::output(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::output(format!("Failed to write {}: {e}", temp_path.display())))?;

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::output(format!(
                "Failed to rename {}: {e}",
                temp_path.display()
            )));
        }

        Ok(())
    }
}
