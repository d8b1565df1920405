//! Exchange configuration parsing from environment variables.

use crate::infrastructure::bybit::market_data::{BYBIT_MAINNET_URL, BYBIT_TESTNET_URL};
use anyhow::{Context, Result};
use std::env;

/// Bybit v5 public API configuration
#[derive(Debug, Clone)]
pub struct BybitConfig {
    pub testnet: bool,
    pub base_url: String,
    pub category: String,
    pub quote_coin: String,
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            testnet: false,
            base_url: BYBIT_MAINNET_URL.to_string(),
            category: "linear".to_string(),
            quote_coin: "USDT".to_string(),
        }
    }
}

impl BybitConfig {
    pub fn from_env() -> Result<Self> {
        let testnet = env::var("BYBIT_TESTNET")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .context("Failed to parse BYBIT_TESTNET - must be true or false")?;

        let default_url = if testnet {
            BYBIT_TESTNET_URL
        } else {
            BYBIT_MAINNET_URL
        };

        Ok(Self {
            testnet,
            base_url: env::var("BYBIT_BASE_URL").unwrap_or_else(|_| default_url.to_string()),
            category: env::var("BYBIT_CATEGORY").unwrap_or_else(|_| "linear".to_string()),
            quote_coin: env::var("BYBIT_QUOTE_COIN").unwrap_or_else(|_| "USDT".to_string()),
        })
    }
}
