use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::TelegramConfig;
use crate::processor::NormalizationPolicy;

/// Whole-run configuration, handed to the orchestrator at construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub site: SiteConfig,
    pub scraping: ScrapingConfig,
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
    pub telegram: TelegramConfig,
    pub meta: MetaConfig,
    pub normalization: NormalizationPolicy,
}

/// Basic site information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
}

/// Deadlines for the network collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub navigation_timeout_secs: u64,
    pub image_timeout_secs: u64,
    pub notify_timeout_secs: u64,
}

/// CSS selectors for the catalog pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub latest_module: String,
    pub latest_link: String,
    pub device_name: String,
    pub device_image: String,
    pub highlights: String,
    pub spec_tables: String,
}

/// Where records, images and the ledger are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub raw_dir: PathBuf,
    pub formatted_dir: PathBuf,
    pub images_dir: PathBuf,
    pub meta_dir: PathBuf,
    pub ledger_file: PathBuf,
    pub link_snapshot_dir: Option<PathBuf>,
    pub image_width: u32,
}

/// SEO meta-tag generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaConfig {
    pub enabled: bool,
    pub country: String,
    pub country_code: String,
}

impl PipelineConfig {
    /// Load configuration from TOML file, then pick up credentials from the
    /// environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.telegram.load_credentials();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.site.base_url.is_empty() {
            return Err(anyhow!("Site base URL cannot be empty"));
        }

        if !self.site.base_url.starts_with("http://") && !self.site.base_url.starts_with("https://") {
            return Err(anyhow!("Site base URL must be absolute: {}", self.site.base_url));
        }

        if self.output.image_width == 0 {
            return Err(anyhow!("Image width must be greater than zero"));
        }

        Ok(())
    }
}

impl SiteConfig {
    /// Resolve a page-relative href against the site root.
    pub fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        if let Some(rest) = href.strip_prefix("//") {
            return format!("https://{}", rest);
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }
}

impl OutputConfig {
    /// Same layout with every path placed under `root`.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let defaults = Self::default();
        Self {
            raw_dir: root.join(defaults.raw_dir),
            formatted_dir: root.join(defaults.formatted_dir),
            images_dir: root.join(defaults.images_dir),
            meta_dir: root.join(defaults.meta_dir),
            ledger_file: root.join(defaults.ledger_file),
            link_snapshot_dir: defaults.link_snapshot_dir.map(|dir| root.join(dir)),
            image_width: defaults.image_width,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "gsmarena".to_string(),
            base_url: "https://www.gsmarena.com/".to_string(),
        }
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: 120,
            image_timeout_secs: 15,
            notify_timeout_secs: 30,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            latest_module: "div.module-phones.module-latest".to_string(),
            latest_link: "a.module-phones-link".to_string(),
            device_name: "h1.specs-phone-name-title".to_string(),
            device_image: ".specs-photo-main img".to_string(),
            highlights: ".specs-spotlight-features li".to_string(),
            spec_tables: "#specs-list table".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("raw_data"),
            formatted_dir: PathBuf::from("formatted_data"),
            images_dir: PathBuf::from("images"),
            meta_dir: PathBuf::from("meta_data"),
            ledger_file: PathBuf::from("scraped_devices.csv"),
            link_snapshot_dir: Some(PathBuf::from("latest_device_link")),
            image_width: 300,
        }
    }
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            country: "Bangladesh".to_string(),
            country_code: "bd".to_string(),
        }
    }
}
