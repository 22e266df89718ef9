use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use config::PipelineConfig;
use fetcher::HtmlFetcher;
use notify::{NoopNotifier, Notifier, TelegramNotifier};
use pipeline::{BatchOrchestrator, Collaborators, renormalize_from_raw};
use processor::generate_meta_tags;
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod config;
mod fetcher;
mod models;
mod notify;
mod pipeline;
mod processor;
mod storage;

const DEFAULT_CONFIG: &str = "src/configs/gsmarena.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = load_config(arg_value(&args, "--config").as_deref())?;

    if let Some(name) = arg_value(&args, "--meta") {
        let tags = generate_meta_tags(&name, Local::now().year(), &config.meta);
        println!("{}", serde_json::to_string_pretty(&tags)?);
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--from-raw") {
        info!("🚀 Re-normalizing stored raw records");
        renormalize_from_raw(&config).await?;
        return Ok(());
    }

    let fetcher = Arc::new(HtmlFetcher::new(&config).context("Failed to build HTTP client")?);

    let notify_timeout = Duration::from_secs(config.scraping.notify_timeout_secs);
    let notifier: Arc<dyn Notifier> =
        match TelegramNotifier::from_config(&config.telegram, notify_timeout)? {
            Some(telegram) => Arc::new(telegram),
            None => {
                warn!("⚠️ Telegram credentials missing or disabled. Notifications are off.");
                Arc::new(NoopNotifier)
            }
        };

    let sources = Collaborators {
        links: fetcher.clone(),
        pages: fetcher.clone(),
        images: fetcher,
        notifier,
    };

    let orchestrator = BatchOrchestrator::new(config, sources)?;
    let summary = orchestrator.run().await?;
    summary.log();

    Ok(())
}

/// An explicit `--config` must exist; the default path falls back to
/// built-in settings when absent.
fn load_config(path: Option<&str>) -> Result<PipelineConfig> {
    if let Some(path) = path {
        return PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration: {}", path));
    }

    if Path::new(DEFAULT_CONFIG).exists() {
        let config = PipelineConfig::from_file(DEFAULT_CONFIG)?;
        info!("Loaded configuration: {} ({})", DEFAULT_CONFIG, config.site.name);
        return Ok(config);
    }

    warn!("Config file not found: {}. Using defaults.", DEFAULT_CONFIG);
    let mut config = PipelineConfig::default();
    config.telegram.load_credentials();
    config.validate()?;
    Ok(config)
}

/// Value following `flag`, e.g. `--config path.toml`.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_value() {
        let args: Vec<String> = ["--from-raw", "--config", "alt.toml", "--meta"]
            .iter()
            .map(|a| a.to_string())
            .collect();

        assert_eq!(arg_value(&args, "--config").as_deref(), Some("alt.toml"));
        assert_eq!(arg_value(&args, "--meta"), None);
        assert_eq!(arg_value(&args, "--missing"), None);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        assert!(load_config(Some("/nonexistent/config.toml")).is_err());
    }
}
