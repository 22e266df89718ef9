use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use super::StorageManager;
use crate::config::OutputConfig;
use crate::models::{FixedSchemaRecord, RawSpecRecord};
use crate::processor::MetaTags;

/// Output directories on local disk. Files are created or overwritten by
/// derived name; nothing here is append-only.
pub struct LocalStorage {
    output: OutputConfig,
}

impl LocalStorage {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    /// Create every output directory that does not exist yet.
    pub async fn ensure_dirs(&self) -> Result<()> {
        let mut dirs = vec![
            &self.output.raw_dir,
            &self.output.formatted_dir,
            &self.output.images_dir,
            &self.output.meta_dir,
        ];
        if let Some(snapshot_dir) = &self.output.link_snapshot_dir {
            dirs.push(snapshot_dir);
        }

        for dir in dirs {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        if let Some(parent) = self.output.ledger_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        Ok(())
    }

    async fn write_json<T: Serialize>(&self, path: PathBuf, value: &T) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub async fn store_raw(&self, safe_name: &str, record: &RawSpecRecord) -> Result<PathBuf> {
        let path = self.output.raw_dir.join(format!("{}.json", safe_name));
        let path = self.write_json(path, record).await?;
        info!("✅ Raw saved: {}", path.display());
        Ok(path)
    }

    pub async fn store_formatted(&self, safe_name: &str, record: &FixedSchemaRecord) -> Result<PathBuf> {
        let path = self.output.formatted_dir.join(format!("{}.json", safe_name));
        let path = self.write_json(path, record).await?;
        info!("✅ Formatted saved: {}", path.display());
        Ok(path)
    }

    pub async fn store_meta(&self, safe_name: &str, tags: &MetaTags) -> Result<PathBuf> {
        let path = self.output.meta_dir.join(format!("{}.json", safe_name));
        self.write_json(path, tags).await
    }

    pub fn image_path(&self, safe_name: &str, image_url: &str) -> PathBuf {
        let extension = StorageManager::image_extension(image_url);
        self.output.images_dir.join(format!("{}{}", safe_name, extension))
    }

    /// Write the discovered links, one per line, to the dated snapshot file.
    /// Returns `None` when snapshots are disabled.
    pub async fn store_link_snapshot(&self, links: &[String], date: NaiveDate) -> Result<Option<PathBuf>> {
        let Some(dir) = &self.output.link_snapshot_dir else {
            return Ok(None);
        };

        let path = dir.join(StorageManager::snapshot_file_name(date));
        let mut body = links.join("\n");
        body.push('\n');
        fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some(path))
    }

    /// Raw record files, sorted by name.
    pub async fn list_raw_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.output.raw_dir)
            .await
            .with_context(|| format!("Failed to read {}", self.output.raw_dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    pub async fn load_raw(&self, path: &Path) -> Result<RawSpecRecord> {
        let json = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
    }
}
