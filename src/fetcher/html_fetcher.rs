use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};
use wreq::Client;
use wreq_util::Emulation;

use super::{ImageSource, LinkSource, PageParser, PageSource};
use crate::config::PipelineConfig;
use crate::models::RawSpecRecord;

/// HTTP + static HTML implementation of the catalog collaborators.
///
/// One client is shared by discovery, page reads and image downloads.
pub struct HtmlFetcher {
    client: Client,
    base_url: String,
    parser: PageParser,
    navigation_timeout: Duration,
    image_timeout: Duration,
}

impl HtmlFetcher {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let client = Client::builder()
            .emulation(Emulation::Firefox136)
            .build()?;

        Ok(HtmlFetcher {
            client,
            base_url: config.site.base_url.clone(),
            parser: PageParser::new(&config.site, &config.selectors)?,
            navigation_timeout: Duration::from_secs(config.scraping.navigation_timeout_secs),
            image_timeout: Duration::from_secs(config.scraping.image_timeout_secs),
        })
    }

    /// Fetch HTML page text.
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Network error: {}", e))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {}", response.status()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response text: {}", e))?;

        if html.is_empty() {
            return Err(anyhow!("Empty HTML response"));
        }

        info!("Fetched {} characters from {}", html.len(), url);
        Ok(html)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Network error: {}", e))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {}", response.status()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| anyhow!("Failed to read response body: {}", e))?;
        Ok(bytes.to_vec())
    }
}

/// Run `fut` with a fixed deadline.
pub(crate) async fn with_deadline<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    timeout(limit, fut)
        .await
        .map_err(|_| anyhow!("Timed out after {:?} {}", limit, what))?
}

#[async_trait]
impl LinkSource for HtmlFetcher {
    async fn discover_links(&self) -> Result<Vec<String>> {
        info!("🔄 Navigating to: {}", self.base_url);
        let html = with_deadline(
            self.navigation_timeout,
            "loading the home page",
            self.fetch_page(&self.base_url),
        )
        .await
        .context("Failed to load latest devices page")?;

        let links = self.parser.parse_latest_links(&html);
        if links.is_empty() {
            warn!("❌ No device links found in the latest devices section");
        } else {
            info!("🔗 Found {} links.", links.len());
        }
        Ok(links)
    }
}

#[async_trait]
impl PageSource for HtmlFetcher {
    async fn extract(&self, url: &str) -> Result<RawSpecRecord> {
        info!("🔄 Navigating to: {}", url);
        let html = with_deadline(self.navigation_timeout, "loading device page", self.fetch_page(url))
            .await?;

        let record = self.parser.parse_device_page(&html, url)?;
        info!(
            "📱 Scraped {} ({} spec categories)",
            record.name,
            record.specs.len()
        );
        Ok(record)
    }
}

#[async_trait]
impl ImageSource for HtmlFetcher {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        with_deadline(self.image_timeout, "downloading image", self.fetch_bytes(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_expires() {
        let result: Result<()> = with_deadline(Duration::from_millis(10), "sleeping", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("Timed out"), "{err}");
    }

    #[tokio::test]
    async fn test_deadline_passes_inner_error() {
        let result: Result<()> =
            with_deadline(Duration::from_secs(1), "failing", async { Err(anyhow!("boom")) }).await;
        assert_eq!(result.unwrap_err().to_string(), "boom");
    }

    #[test]
    fn test_fetcher_builds_from_default_config() {
        let fetcher = HtmlFetcher::new(&PipelineConfig::default()).unwrap();
        assert_eq!(fetcher.navigation_timeout, Duration::from_secs(120));
        assert_eq!(fetcher.image_timeout, Duration::from_secs(15));
    }
}
