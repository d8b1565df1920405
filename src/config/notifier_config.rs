//! Notification channel configuration parsing from environment variables.

use std::env;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API configuration. Both credentials are optional; without
/// them notifications are skipped.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_url: TELEGRAM_API_URL.to_string(),
        }
    }
}

impl TelegramConfig {
    pub fn from_env() -> Self {
        Self {
            bot_token: non_empty_var("TELEGRAM_BOT_TOKEN"),
            chat_id: non_empty_var("TELEGRAM_CHAT_ID"),
            api_url: env::var("TELEGRAM_API_URL").unwrap_or_else(|_| TELEGRAM_API_URL.to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
