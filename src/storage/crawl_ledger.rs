use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::models::LedgerEntry;

const HEADER: [&str; 2] = ["Device Name", "URL"];

/// Append-only CSV log of processed items, keyed by URL.
///
/// The ledger never rewrites or deduplicates rows. Callers must consult
/// [`CrawlLedger::diff`] before processing so a URL is appended once.
pub struct CrawlLedger {
    path: PathBuf,
}

impl CrawlLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every URL recorded so far. A missing, empty or header-only ledger
    /// yields an empty set; rows without a URL column are skipped.
    pub fn load(&self) -> Result<HashSet<String>> {
        if !self.path.exists() {
            return Ok(HashSet::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open ledger: {}", self.path.display()))?;

        let mut urls = HashSet::new();
        for record in reader.records() {
            let record = record
                .with_context(|| format!("Failed to read ledger: {}", self.path.display()))?;
            if let Some(url) = record.get(1).filter(|url| !url.is_empty()) {
                urls.insert(url.to_string());
            }
        }
        Ok(urls)
    }

    /// Append one row, writing the header first when the ledger is new.
    pub fn append(&self, name: &str, url: &str) -> Result<()> {
        let is_new = std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open ledger: {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            writer.write_record(HEADER)?;
        }
        writer.serialize(LedgerEntry {
            name: name.to_string(),
            url: url.to_string(),
        })?;
        writer
            .flush()
            .with_context(|| format!("Failed to write ledger: {}", self.path.display()))?;
        Ok(())
    }

    /// Candidates not yet in `known`, in discovery order. A URL listed twice
    /// among the candidates is kept once.
    pub fn diff(candidates: &[String], known: &HashSet<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        candidates
            .iter()
            .filter(|url| !known.contains(*url))
            .filter(|url| seen.insert(url.as_str()))
            .cloned()
            .collect()
    }
}
