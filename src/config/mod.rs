//! Configuration module for the screener.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Exchange, Notifier, Screener, and Observability.

mod exchange_config;
mod notifier_config;
mod observability_config;
mod screener_config;

pub use exchange_config::BybitConfig;
pub use notifier_config::{TELEGRAM_API_URL, TelegramConfig};
pub use observability_config::ObservabilityEnvConfig;
pub use screener_config::ScreenerEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub bybit: BybitConfig,
    pub telegram: TelegramConfig,
    pub screener: ScreenerEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bybit: BybitConfig::from_env().context("Failed to load Bybit config")?,
            telegram: TelegramConfig::from_env(),
            screener: ScreenerEnvConfig::from_env().context("Failed to load screener config")?,
            observability: ObservabilityEnvConfig::from_env(),
        })
    }
}
