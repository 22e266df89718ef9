pub mod telegram;

pub use telegram::*;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::{error, info, warn};

/// Outbound chat channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_photo(&self, caption: &str, image: &Path) -> Result<()>;
    async fn send_text(&self, text: &str) -> Result<()>;

    /// `false` for channels that never deliver anything.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Used when no channel is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_photo(&self, _caption: &str, _image: &Path) -> Result<()> {
        Ok(())
    }

    async fn send_text(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

pub fn new_device_message(name: &str, url: &str) -> String {
    format!("🔔 *Found New Device!*\n\n📱 *Name:* {}\n🔗 *Link:* {}", name, url)
}

/// Announce a new item. Tries the photo message first when an image was
/// saved and falls back to text when that fails. Returns `false` when
/// nothing was delivered; failures never propagate.
pub async fn notify_new_device(
    notifier: &dyn Notifier,
    name: &str,
    url: &str,
    image: Option<&Path>,
) -> bool {
    if !notifier.is_enabled() {
        warn!("⚠️ Notification channel not configured. Skipping notification for {}.", name);
        return false;
    }

    let message = new_device_message(name, url);

    if let Some(image) = image.filter(|path| path.exists()) {
        match notifier.send_photo(&message, image).await {
            Ok(()) => {
                info!("✉️ Notification with image sent for {}", name);
                return true;
            }
            Err(e) => warn!("❌ Failed to send photo: {:#}. Sending text only.", e),
        }
    }

    match notifier.send_text(&message).await {
        Ok(()) => {
            info!("✉️ Text notification sent for {}", name);
            true
        }
        Err(e) => {
            error!("❌ Failed to send any notification: {:#}", e);
            false
        }
    }
}
