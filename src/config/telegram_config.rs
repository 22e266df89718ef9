use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;

/// Notification bot settings. Credentials never live in the file; only the
/// names of the environment variables holding them do.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub api_base: String,
    pub parse_mode: String,
    // Optional environment variable names for customization
    pub env_bot_token: Option<String>,
    pub env_chat_id: Option<String>,
    // These fields will be loaded from environment variables
    #[serde(skip)]
    pub bot_token: Option<String>,
    #[serde(skip)]
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    pub fn load_credentials(&mut self) {
        self.load_credentials_from(|name| env::var(name).ok());
    }

    /// Fill the credentials through `lookup`, which maps a variable name to
    /// its value. Missing or blank values leave the credential unset.
    pub fn load_credentials_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_var = self.env_bot_token.as_deref().unwrap_or("TELEGRAM_BOT_TOKEN");
        let chat_var = self.env_chat_id.as_deref().unwrap_or("TELEGRAM_CHAT_ID");

        self.bot_token = lookup(token_var).filter(|v| !v.trim().is_empty());
        self.chat_id = lookup(chat_var).filter(|v| !v.trim().is_empty());
    }

    pub fn is_configured(&self) -> bool {
        self.enabled && self.bot_token.is_some() && self.chat_id.is_some()
    }

    pub fn get_bot_token(&self) -> Result<&str> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| anyhow!("Telegram bot token not loaded"))
    }

    pub fn get_chat_id(&self) -> Result<&str> {
        self.chat_id
            .as_deref()
            .ok_or_else(|| anyhow!("Telegram chat id not loaded"))
    }

    /// `https://api.telegram.org/bot<token>/<method>`
    pub fn method_url(&self, method: &str) -> Result<String> {
        Ok(format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.get_bot_token()?,
            method
        ))
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://api.telegram.org".to_string(),
            parse_mode: "Markdown".to_string(),
            bot_token: None,
            chat_id: None,
            env_bot_token: None,
            env_chat_id: None,
        }
    }
}
