//! Telegram Bot API notifier
//!
//! Sends one HTML message per scan cycle with the new signals, plus error
//! alerts. Missing credentials turn every send into a logged no-op.

use crate::config::TelegramConfig;
use crate::domain::errors::NotificationError;
use crate::domain::ports::SignalNotifier;
use crate::domain::signal::{Signal, SignalStrength};
use crate::infrastructure::core::http_client_factory::HttpClientFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::{debug, warn};

/// Weak signals listed before the rest are summarised
const WEAK_SIGNALS_LISTED: usize = 10;

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: ClientWithMiddleware,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        if !config.is_configured() {
            warn!("TelegramNotifier: Bot token or chat id missing, notifications disabled");
        }
        Self {
            client: HttpClientFactory::create_client(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn credentials(&self) -> Result<(&str, &str), NotificationError> {
        match (&self.config.bot_token, &self.config.chat_id) {
            (Some(token), Some(chat_id)) => Ok((token.as_str(), chat_id.as_str())),
            (None, _) => Err(NotificationError::NotConfigured {
                reason: "TELEGRAM_BOT_TOKEN is not set".to_string(),
            }),
            (_, None) => Err(NotificationError::NotConfigured {
                reason: "TELEGRAM_CHAT_ID is not set".to_string(),
            }),
        }
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        let (token, chat_id) = match self.credentials() {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("TelegramNotifier: {}, message dropped", e);
                return Ok(());
            }
        };

        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            token
        );
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let body = serde_json::to_string(&request).context("Failed to encode Telegram request")?;

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .context("Failed to reach Telegram API")?;

        let body: SendMessageResponse = response
            .json()
            .await
            .context("Failed to parse Telegram response")?;

        if !body.ok {
            return Err(NotificationError::Api {
                description: body
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            }
            .into());
        }

        debug!("TelegramNotifier: Message delivered");
        Ok(())
    }
}

#[async_trait]
impl SignalNotifier for TelegramNotifier {
    async fn notify_batch(&self, signals: &[Signal]) -> Result<()> {
        if signals.is_empty() {
            return Ok(());
        }
        let message = format_batch_message(signals, Utc::now());
        self.send_message(&message).await
    }

    async fn notify_error(&self, error: &str) -> Result<()> {
        let message = format_error_message(error, Utc::now());
        self.send_message(&message).await
    }
}

pub fn format_batch_message(signals: &[Signal], now: DateTime<Utc>) -> String {
    let (strong, weak): (Vec<&Signal>, Vec<&Signal>) = signals
        .iter()
        .partition(|s| s.strength == SignalStrength::Strong);

    let mut message = String::new();
    let _ = writeln!(message, "📊 <b>CRYPTO SIGNALS UPDATE</b>");
    let _ = writeln!(message, "📅 {}\n", now.format("%Y-%m-%d %H:%M UTC"));

    if !strong.is_empty() {
        let _ = writeln!(message, "🔥 <b>STRONG SIGNALS ({}):</b>", strong.len());
        for signal in &strong {
            push_signal_line(&mut message, signal);
        }
        message.push('\n');
    }

    if !weak.is_empty() {
        let _ = writeln!(message, "⚡ <b>WEAK SIGNALS ({}):</b>", weak.len());
        for signal in weak.iter().take(WEAK_SIGNALS_LISTED) {
            push_signal_line(&mut message, signal);
        }
        if weak.len() > WEAK_SIGNALS_LISTED {
            let _ = writeln!(message, "... and {} more", weak.len() - WEAK_SIGNALS_LISTED);
        }
    }

    message
}

pub fn format_error_message(error: &str, now: DateTime<Utc>) -> String {
    format!(
        "🚨 <b>SCREENER ERROR</b>\n\n❌ <b>Error:</b> {}\n⏰ <b>Time:</b> {}",
        escape_html(error),
        now.format("%Y-%m-%d %H:%M UTC")
    )
}

fn push_signal_line(message: &mut String, signal: &Signal) {
    let _ = writeln!(
        message,
        "• {} - ${} ({:+.2}%)",
        signal.symbol, signal.price, signal.price_change_24h
    );
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::fixtures::signal;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_batch_lists_strong_then_weak() {
        let mut btc = signal("BTCUSDT", 1, SignalStrength::Strong);
        btc.price = 64000.5;
        btc.price_change_24h = 3.25;
        let mut eth = signal("ETHUSDT", 2, SignalStrength::Weak);
        eth.price = 3100.0;
        eth.price_change_24h = -1.5;

        let message = format_batch_message(&[eth, btc], now());

        assert!(message.starts_with("📊 <b>CRYPTO SIGNALS UPDATE</b>\n📅 2024-03-01 12:30 UTC\n"));
        assert!(message.contains("🔥 <b>STRONG SIGNALS (1):</b>\n• BTCUSDT - $64000.5 (+3.25%)\n"));
        assert!(message.contains("⚡ <b>WEAK SIGNALS (1):</b>\n• ETHUSDT - $3100 (-1.50%)\n"));
        assert!(message.find("STRONG").unwrap() < message.find("WEAK").unwrap());
    }

    #[test]
    fn test_weak_section_is_capped() {
        let signals: Vec<Signal> = (0..13)
            .map(|i| signal(&format!("W{}USDT", i), i, SignalStrength::Weak))
            .collect();

        let message = format_batch_message(&signals, now());

        assert!(message.contains("WEAK SIGNALS (13)"));
        assert_eq!(message.matches("• ").count(), 10);
        assert!(message.contains("... and 3 more"));
        assert!(!message.contains("STRONG"));
    }

    #[test]
    fn test_strong_section_is_not_capped() {
        let signals: Vec<Signal> = (0..15)
            .map(|i| signal(&format!("S{}USDT", i), i, SignalStrength::Strong))
            .collect();

        let message = format_batch_message(&signals, now());
        assert_eq!(message.matches("• ").count(), 15);
        assert!(!message.contains("more"));
    }

    #[test]
    fn test_error_message_is_escaped() {
        let message = format_error_message("retCode 10006 <rate limit> & retry", now());
        assert!(message.contains("<b>SCREENER ERROR</b>"));
        assert!(message.contains("retCode 10006 &lt;rate limit&gt; &amp; retry"));
        assert!(message.ends_with("2024-03-01 12:30 UTC"));
    }

    #[tokio::test]
    async fn test_unconfigured_notifier_is_a_no_op() {
        let notifier = TelegramNotifier::new(TelegramConfig {
            bot_token: None,
            chat_id: Some("42".to_string()),
            api_url: "http://127.0.0.1:9".to_string(),
        });
        assert!(!notifier.is_configured());
        assert!(matches!(
            notifier.credentials(),
            Err(NotificationError::NotConfigured { .. })
        ));
        assert!(
            notifier
                .notify_batch(&[signal("BTCUSDT", 1, SignalStrength::Strong)])
                .await
                .is_ok()
        );
        assert!(notifier.notify_error("boom").await.is_ok());
    }
}
