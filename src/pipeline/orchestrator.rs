use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{ItemError, ItemStage};
use crate::config::PipelineConfig;
use crate::fetcher::{ImageSource, LinkSource, PageSource, download_and_resize};
use crate::models::RawSpecRecord;
use crate::notify::{Notifier, notify_new_device};
use crate::processor::{SpecNormalizer, generate_meta_tags};
use crate::storage::{CrawlLedger, LocalStorage, StorageManager};

/// External collaborators of a batch run.
#[derive(Clone)]
pub struct Collaborators {
    pub links: Arc<dyn LinkSource>,
    pub pages: Arc<dyn PageSource>,
    pub images: Arc<dyn ImageSource>,
    pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug)]
pub struct ItemFailure {
    pub url: String,
    pub error: ItemError,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub discovered: usize,
    pub new_items: usize,
    pub processed: usize,
    pub notified: usize,
    pub failures: Vec<ItemFailure>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn log(&self) {
        info!("\n=== Batch Summary ===");
        info!("🔎 Discovered links: {}", self.discovered);
        info!("🆕 New devices: {}", self.new_items);
        info!("✅ Processed: {} (notified: {})", self.processed, self.notified);

        if self.failures.is_empty() {
            info!("🎉 Batch completed without failures");
        } else {
            warn!("⚠️ Failed: {}", self.failed());
            for failure in &self.failures {
                warn!("  - {} ({}): {}", failure.url, failure.error.reached(), failure.error);
            }
        }
    }
}

/// Drives one run: discover links, skip the ones already in the ledger,
/// then take each new item through extraction, normalization, persistence
/// and notification, one at a time in discovery order.
pub struct BatchOrchestrator {
    config: PipelineConfig,
    sources: Collaborators,
    storage: LocalStorage,
    ledger: CrawlLedger,
    normalizer: SpecNormalizer,
}

impl BatchOrchestrator {
    pub fn new(config: PipelineConfig, sources: Collaborators) -> Result<Self> {
        let normalizer = SpecNormalizer::new(config.normalization.clone())
            .context("Failed to build normalizer")?;
        let storage = LocalStorage::new(config.output.clone());
        let ledger = CrawlLedger::new(config.output.ledger_file.clone());

        Ok(Self {
            config,
            sources,
            storage,
            ledger,
            normalizer,
        })
    }

    pub async fn run(&self) -> Result<BatchSummary> {
        let today = Local::now().date_naive();
        info!(
            "🚀 Starting {} run (policy {})",
            self.config.site.name,
            self.normalizer.policy().version
        );

        self.storage.ensure_dirs().await?;

        let links = self
            .sources
            .links
            .discover_links()
            .await
            .context("Failed to discover device links")?;
        info!("🔎 Found {} device links", links.len());

        match self.storage.store_link_snapshot(&links, today).await {
            Ok(Some(path)) => info!("📝 Link snapshot saved: {}", path.display()),
            Ok(None) => {}
            Err(e) => warn!("⚠️ Failed to save link snapshot: {:#}", e),
        }

        let known = self
            .ledger
            .load()
            .with_context(|| format!("Failed to load ledger: {}", self.ledger.path().display()))?;
        let work = CrawlLedger::diff(&links, &known);

        let mut summary = BatchSummary {
            discovered: links.len(),
            new_items: work.len(),
            ..Default::default()
        };

        if work.is_empty() {
            info!("😴 No new devices found");
            return Ok(summary);
        }
        info!("🆕 {} new devices to process", work.len());

        for url in work {
            match self.process_item(&url, today).await {
                Ok(stage) => {
                    summary.processed += 1;
                    if stage == ItemStage::Notified {
                        summary.notified += 1;
                    }
                }
                Err(error) => {
                    error!("❌ {}: {}", url, error);
                    summary.failures.push(ItemFailure { url, error });
                }
            }
        }

        Ok(summary)
    }

    async fn process_item(&self, url: &str, today: NaiveDate) -> Result<ItemStage, ItemError> {
        info!("📱 Processing {}", url);

        let record = self
            .sources
            .pages
            .extract(url)
            .await
            .map_err(ItemError::Extraction)?;
        debug!("{} {}: {}", ItemStage::Extracted, url, record.name);

        let formatted = self.normalizer.normalize(&record);
        debug!("{} {}", ItemStage::Normalized, url);

        let safe_name = StorageManager::safe_name(&record.name);
        self.storage
            .store_raw(&safe_name, &record)
            .await
            .map_err(ItemError::Persistence)?;
        self.storage
            .store_formatted(&safe_name, &formatted)
            .await
            .map_err(ItemError::Persistence)?;

        self.store_meta(&record, &safe_name, today).await;
        let image = self.store_image(&record, &safe_name).await;

        self.ledger
            .append(&record.name, url)
            .map_err(ItemError::Ledger)?;
        debug!("{} {}", ItemStage::Persisted, url);

        let notified = notify_new_device(
            self.sources.notifier.as_ref(),
            &record.name,
            url,
            image.as_deref(),
        )
        .await;

        if notified {
            Ok(ItemStage::Notified)
        } else {
            Ok(ItemStage::Persisted)
        }
    }

    async fn store_meta(&self, record: &RawSpecRecord, safe_name: &str, today: NaiveDate) {
        if !self.config.meta.enabled {
            return;
        }

        let tags = generate_meta_tags(&record.name, today.year(), &self.config.meta);
        if let Err(e) = self.storage.store_meta(safe_name, &tags).await {
            warn!("⚠️ Failed to save meta tags for {}: {:#}", record.name, e);
        }
    }

    async fn store_image(&self, record: &RawSpecRecord, safe_name: &str) -> Option<PathBuf> {
        let url = record.image.as_deref()?;
        let path = self.storage.image_path(safe_name, url);

        match download_and_resize(
            self.sources.images.as_ref(),
            url,
            path,
            self.config.output.image_width,
        )
        .await
        {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("⚠️ Failed to save image for {}: {:#}", record.name, e);
                None
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RenormalizeSummary {
    pub rewritten: usize,
    pub failed: usize,
}

/// Rebuild every normalized record from the stored raw records. No
/// network access and no ledger changes.
pub async fn renormalize_from_raw(config: &PipelineConfig) -> Result<RenormalizeSummary> {
    let normalizer = SpecNormalizer::new(config.normalization.clone())?;
    let storage = LocalStorage::new(config.output.clone());
    storage.ensure_dirs().await?;

    let mut summary = RenormalizeSummary::default();
    for path in storage.list_raw_files().await? {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        let stored = match storage.load_raw(&path).await {
            Ok(record) => storage.store_formatted(&stem, &normalizer.normalize(&record)).await,
            Err(e) => Err(e),
        };

        match stored {
            Ok(_) => summary.rewritten += 1,
            Err(e) => {
                error!("❌ {}: {:#}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "♻️ Re-normalized {} records ({} failed)",
        summary.rewritten, summary.failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;
    use crate::models::SpecTable;
    use crate::notify::NoopNotifier;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::collections::HashSet;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Mutex;

    struct StaticLinks(Vec<String>);

    #[async_trait]
    impl LinkSource for StaticLinks {
        async fn discover_links(&self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenLinks;

    #[async_trait]
    impl LinkSource for BrokenLinks {
        async fn discover_links(&self) -> Result<Vec<String>> {
            Err(anyhow!("navigation timed out"))
        }
    }

    /// Serves a page for every URL except the ones listed as broken.
    #[derive(Default)]
    struct FakePages {
        broken: HashSet<String>,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageSource for FakePages {
        async fn extract(&self, url: &str) -> Result<RawSpecRecord> {
            self.requested.lock().unwrap().push(url.to_string());
            if self.broken.contains(url) {
                return Err(anyhow!("title element not found"));
            }

            let slug = url.rsplit('/').next().unwrap_or("x").trim_end_matches(".php");
            let mut specs = SpecTable::new();
            specs.insert("BATTERY", "Type", "Li-Ion 5000 mAh, non-removable");
            specs.insert("MEMORY", "Card slot", "No");
            specs.insert("MEMORY", "Internal", "256GB 12GB RAM");

            Ok(RawSpecRecord {
                url: url.to_string(),
                name: format!("Acme {}", slug.to_uppercase()),
                image: Some(format!("https://cdn.example.com/{}.png", slug)),
                highlights: vec![],
                specs,
            })
        }
    }

    struct FakeImages {
        fail: bool,
    }

    #[async_trait]
    impl ImageSource for FakeImages {
        async fn fetch_image(&self, _url: &str) -> Result<Vec<u8>> {
            if self.fail {
                return Err(anyhow!("HTTP 404"));
            }
            let img = DynamicImage::ImageRgb8(RgbImage::new(600, 400));
            let mut bytes = Cursor::new(Vec::new());
            img.write_to(&mut bytes, ImageFormat::Png)?;
            Ok(bytes.into_inner())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_photo(&self, caption: &str, image: &Path) -> Result<()> {
            self.messages
                .lock()
                .unwrap()
                .push(format!("photo {} {}", image.display(), caption));
            Ok(())
        }

        async fn send_text(&self, text: &str) -> Result<()> {
            self.messages.lock().unwrap().push(format!("text {}", text));
            Ok(())
        }
    }

    struct Harness {
        dir: tempfile::TempDir,
        pages: Arc<FakePages>,
        notifier: Arc<RecordingNotifier>,
    }

    impl Harness {
        fn new(broken: &[&str]) -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                pages: Arc::new(FakePages {
                    broken: broken.iter().map(|u| u.to_string()).collect(),
                    ..Default::default()
                }),
                notifier: Arc::new(RecordingNotifier::default()),
            }
        }

        fn config(&self) -> PipelineConfig {
            PipelineConfig {
                output: OutputConfig::rooted_at(self.dir.path()),
                ..Default::default()
            }
        }

        fn orchestrator(&self, links: Arc<dyn LinkSource>, fail_images: bool) -> BatchOrchestrator {
            let sources = Collaborators {
                links,
                pages: self.pages.clone(),
                images: Arc::new(FakeImages { fail: fail_images }),
                notifier: self.notifier.clone(),
            };
            BatchOrchestrator::new(self.config(), sources).unwrap()
        }

        fn ledger(&self) -> CrawlLedger {
            CrawlLedger::new(self.config().output.ledger_file)
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.dir.path().join(rel)
        }
    }

    fn links(urls: &[&str]) -> Arc<dyn LinkSource> {
        Arc::new(StaticLinks(urls.iter().map(|u| u.to_string()).collect()))
    }

    #[tokio::test]
    async fn test_new_items_processed_in_discovery_order() {
        let harness = Harness::new(&[]);
        harness.ledger().append("Old", "https://a/old.php").unwrap();

        let orchestrator = harness.orchestrator(links(&["https://a/x2.php", "https://a/x1.php"]), false);
        let summary = orchestrator.run().await.unwrap();

        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.new_items, 2);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.notified, 2);
        assert_eq!(summary.failed(), 0);
        assert_eq!(
            *harness.pages.requested.lock().unwrap(),
            vec!["https://a/x2.php".to_string(), "https://a/x1.php".to_string()]
        );

        let ledger = std::fs::read_to_string(harness.path("scraped_devices.csv")).unwrap();
        assert_eq!(
            ledger,
            "Device Name,URL\nOld,https://a/old.php\nAcme X2,https://a/x2.php\nAcme X1,https://a/x1.php\n"
        );

        let formatted: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(harness.path("formatted_data/Acme_X1.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(formatted["Hardware"]["RAM:"], "12GB");
        assert_eq!(formatted["Hardware"]["Internal storage:"], "256GB (UFS), not expandable");
        assert_eq!(formatted["Battery"]["Capacity:"], "5000 mAh");

        assert!(harness.path("raw_data/Acme_X1.json").exists());
        assert!(harness.path("meta_data/Acme_X1.json").exists());

        let (width, _) = image::image_dimensions(harness.path("images/Acme_X1.png")).unwrap();
        assert_eq!(width, 300);

        let messages = harness.notifier.messages.lock().unwrap();
        assert!(messages.iter().all(|m| m.starts_with("photo ")));
    }

    #[tokio::test]
    async fn test_failed_extraction_does_not_stop_siblings() {
        let harness = Harness::new(&["https://a/bad.php"]);
        let orchestrator = harness.orchestrator(
            links(&["https://a/x1.php", "https://a/bad.php", "https://a/x2.php"]),
            false,
        );

        let summary = orchestrator.run().await.unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.failures[0].url, "https://a/bad.php");
        assert!(matches!(summary.failures[0].error, ItemError::Extraction(_)));

        let known = harness.ledger().load().unwrap();
        assert!(known.contains("https://a/x1.php"));
        assert!(known.contains("https://a/x2.php"));
        assert!(!known.contains("https://a/bad.php"));
    }

    #[tokio::test]
    async fn test_second_run_does_no_work() {
        let harness = Harness::new(&[]);
        let urls = ["https://a/x1.php", "https://a/x2.php"];

        harness.orchestrator(links(&urls), false).run().await.unwrap();
        let summary = harness.orchestrator(links(&urls), false).run().await.unwrap();

        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.new_items, 0);
        assert_eq!(summary.processed, 0);
        assert_eq!(harness.pages.requested.lock().unwrap().len(), 2);

        let ledger = std::fs::read_to_string(harness.path("scraped_devices.csv")).unwrap();
        assert_eq!(ledger.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_persistence_failure_skips_ledger() {
        let harness = Harness::new(&[]);
        // A directory squatting on the output file name makes the write fail.
        std::fs::create_dir_all(harness.path("formatted_data/Acme_X1.json")).unwrap();

        let orchestrator = harness.orchestrator(links(&["https://a/x1.php", "https://a/x2.php"]), false);
        let summary = orchestrator.run().await.unwrap();

        assert_eq!(summary.processed, 1);
        assert!(matches!(summary.failures[0].error, ItemError::Persistence(_)));

        let known = harness.ledger().load().unwrap();
        assert_eq!(known.len(), 1);
        assert!(known.contains("https://a/x2.php"));
        assert_eq!(harness.notifier.messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_image_failure_is_not_fatal() {
        let harness = Harness::new(&[]);
        let orchestrator = harness.orchestrator(links(&["https://a/x1.php"]), true);

        let summary = orchestrator.run().await.unwrap();
        assert_eq!(summary.processed, 1);
        assert!(harness.ledger().load().unwrap().contains("https://a/x1.php"));

        let messages = harness.notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("text 🔔"));
    }

    #[tokio::test]
    async fn test_disabled_notifications_are_not_counted() {
        let harness = Harness::new(&[]);
        let sources = Collaborators {
            links: links(&["https://a/x1.php"]),
            pages: harness.pages.clone(),
            images: Arc::new(FakeImages { fail: false }),
            notifier: Arc::new(NoopNotifier),
        };

        let summary = BatchOrchestrator::new(harness.config(), sources)
            .unwrap()
            .run()
            .await
            .unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.notified, 0);
        assert!(harness.ledger().load().unwrap().contains("https://a/x1.php"));
    }

    #[tokio::test]
    async fn test_discovery_failure_ends_run() {
        let harness = Harness::new(&[]);
        let orchestrator = harness.orchestrator(Arc::new(BrokenLinks), false);

        assert!(orchestrator.run().await.is_err());
        assert!(!harness.path("scraped_devices.csv").exists());
        assert!(harness.pages.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_link_snapshot_written() {
        let harness = Harness::new(&[]);
        harness.orchestrator(links(&["https://a/x1.php"]), false).run().await.unwrap();

        let snapshots: Vec<_> = std::fs::read_dir(harness.path("latest_device_link"))
            .unwrap()
            .collect();
        assert_eq!(snapshots.len(), 1);
    }

    #[tokio::test]
    async fn test_renormalize_from_raw() {
        let harness = Harness::new(&[]);
        harness.orchestrator(links(&["https://a/x1.php"]), false).run().await.unwrap();

        let formatted = harness.path("formatted_data/Acme_X1.json");
        std::fs::remove_file(&formatted).unwrap();

        let mut config = harness.config();
        config.normalization.storage_technology = "NVMe".to_string();
        let summary = renormalize_from_raw(&config).await.unwrap();
        assert_eq!(summary.rewritten, 1);
        assert_eq!(summary.failed, 0);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(formatted).unwrap()).unwrap();
        assert_eq!(json["Hardware"]["Internal storage:"], "256GB (NVMe), not expandable");
    }
}
