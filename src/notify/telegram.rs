use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use wreq::Client;
use wreq::multipart::{Form, Part};

use super::Notifier;
use crate::config::TelegramConfig;
use crate::fetcher::html_fetcher::with_deadline;

/// Telegram Bot API channel (`sendPhoto` / `sendMessage`).
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
    chat_id: String,
    timeout: Duration,
}

impl TelegramNotifier {
    /// `None` when the channel is disabled or credentials are missing.
    pub fn from_config(config: &TelegramConfig, timeout: Duration) -> Result<Option<Self>> {
        if !config.is_configured() {
            return Ok(None);
        }

        let client = Client::builder().build()?;
        Ok(Some(Self {
            client,
            chat_id: config.get_chat_id()?.to_string(),
            config: config.clone(),
            timeout,
        }))
    }

    async fn post_photo(&self, caption: &str, image: &Path) -> Result<()> {
        let bytes = tokio::fs::read(image)
            .await
            .with_context(|| format!("Failed to read image: {}", image.display()))?;
        let file_name = image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());

        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", self.config.parse_mode.clone())
            .part("photo", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(self.config.method_url("sendPhoto")?)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Telegram sendPhoto failed: HTTP {}", response.status()));
        }
        Ok(())
    }

    async fn post_text(&self, text: &str) -> Result<()> {
        let body = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": self.config.parse_mode,
        });

        let response = self
            .client
            .post(self.config.method_url("sendMessage")?)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Telegram sendMessage failed: HTTP {}", response.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_photo(&self, caption: &str, image: &Path) -> Result<()> {
        with_deadline(self.timeout, "sending photo", self.post_photo(caption, image)).await
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        with_deadline(self.timeout, "sending message", self.post_text(text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_channel_is_skipped() {
        let config = TelegramConfig::default();
        let notifier = TelegramNotifier::from_config(&config, Duration::from_secs(30)).unwrap();
        assert!(notifier.is_none());
    }

    #[test]
    fn test_configured_channel() {
        let mut config = TelegramConfig::default();
        config.load_credentials_from(|name| match name {
            "TELEGRAM_BOT_TOKEN" => Some("123:abc".to_string()),
            "TELEGRAM_CHAT_ID" => Some("42".to_string()),
            _ => None,
        });

        let notifier = TelegramNotifier::from_config(&config, Duration::from_secs(30))
            .unwrap()
            .unwrap();
        assert_eq!(notifier.chat_id, "42");
    }
}
