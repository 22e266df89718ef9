use std::fmt;
use thiserror::Error;

/// Where an item stands in its run. Each stage is reached only after the
/// previous one succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ItemStage {
    Discovered,
    Extracted,
    Normalized,
    Persisted,
    Notified,
}

impl fmt::Display for ItemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemStage::Discovered => "discovered",
            ItemStage::Extracted => "extracted",
            ItemStage::Normalized => "normalized",
            ItemStage::Persisted => "persisted",
            ItemStage::Notified => "notified",
        };
        f.write_str(name)
    }
}

/// A failure that ends one item without touching its siblings.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("extraction failed: {0:#}")]
    Extraction(anyhow::Error),
    #[error("persistence failed: {0:#}")]
    Persistence(anyhow::Error),
    #[error("ledger append failed: {0:#}")]
    Ledger(anyhow::Error),
}

impl ItemError {
    /// Last stage the item reached before failing.
    pub fn reached(&self) -> ItemStage {
        match self {
            ItemError::Extraction(_) => ItemStage::Discovered,
            ItemError::Persistence(_) => ItemStage::Normalized,
            ItemError::Ledger(_) => ItemStage::Normalized,
        }
    }
}
