pub mod html_fetcher;
pub mod image_fetcher;
pub mod page_parser;

pub use html_fetcher::*;
pub use image_fetcher::*;
pub use page_parser::*;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::RawSpecRecord;

/// Produces the candidate item URLs for a run, in discovery order.
#[async_trait]
pub trait LinkSource: Send + Sync {
    async fn discover_links(&self) -> Result<Vec<String>>;
}

/// Reads one item page into a raw record.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn extract(&self, url: &str) -> Result<RawSpecRecord>;
}

/// Downloads image bytes.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}
