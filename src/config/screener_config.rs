//! Screener configuration parsing from environment variables.
//!
//! Scan cadence, batching, signal bookkeeping bounds and the timeframes
//! used to confirm a MACD flip.

use crate::application::agents::{AnalyzerConfig, ScreenerConfig, SignalStoreConfig};
use crate::domain::market::timeframe::Timeframe;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Screener environment configuration
#[derive(Debug, Clone)]
pub struct ScreenerEnvConfig {
    pub scan_interval_seconds: u64,
    pub batch_size: usize,
    pub batch_delay_ms: u64,

    // Signal bookkeeping
    pub seen_signal_capacity: usize,
    pub seen_signal_retain: usize,
    pub visible_signal_capacity: usize,

    // Multi-timeframe confirmation
    pub confirmation_timeframes: Vec<Timeframe>,
    pub strong_confirmation_min: usize,
}

impl Default for ScreenerEnvConfig {
    fn default() -> Self {
        Self {
            scan_interval_seconds: 300,
            batch_size: 5,
            batch_delay_ms: 200,
            seen_signal_capacity: 1000,
            seen_signal_retain: 500,
            visible_signal_capacity: 100,
            confirmation_timeframes: Timeframe::confirmation_set(),
            strong_confirmation_min: 2,
        }
    }
}

impl ScreenerEnvConfig {
    pub fn from_env() -> Result<Self> {
        let timeframes_str =
            env::var("CONFIRMATION_TIMEFRAMES").unwrap_or_else(|_| "5,15,60,D".to_string());
        let confirmation_timeframes: Vec<Timeframe> = timeframes_str
            .split(',')
            .map(|s| s.trim().parse())
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to parse CONFIRMATION_TIMEFRAMES")?;

        let config = Self {
            scan_interval_seconds: Self::parse_u64("SCAN_INTERVAL_SECONDS", 300)?,
            batch_size: Self::parse_usize("SCAN_BATCH_SIZE", 5)?,
            batch_delay_ms: Self::parse_u64("SCAN_BATCH_DELAY_MS", 200)?,
            seen_signal_capacity: Self::parse_usize("SEEN_SIGNAL_CAPACITY", 1000)?,
            seen_signal_retain: Self::parse_usize("SEEN_SIGNAL_RETAIN", 500)?,
            visible_signal_capacity: Self::parse_usize("VISIBLE_SIGNAL_CAPACITY", 100)?,
            confirmation_timeframes,
            strong_confirmation_min: Self::parse_usize("STRONG_CONFIRMATION_MIN", 2)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.scan_interval_seconds == 0 {
            anyhow::bail!("SCAN_INTERVAL_SECONDS must be greater than 0");
        }
        if self.batch_size == 0 {
            anyhow::bail!("SCAN_BATCH_SIZE must be greater than 0");
        }
        if self.seen_signal_retain > self.seen_signal_capacity {
            anyhow::bail!(
                "SEEN_SIGNAL_RETAIN ({}) must not exceed SEEN_SIGNAL_CAPACITY ({})",
                self.seen_signal_retain,
                self.seen_signal_capacity
            );
        }
        Ok(())
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            cross_timeframes: self.confirmation_timeframes.clone(),
            strong_threshold: self.strong_confirmation_min,
            ..AnalyzerConfig::default()
        }
    }

    pub fn screener_config(&self) -> ScreenerConfig {
        ScreenerConfig {
            batch_size: self.batch_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            scan_interval: Duration::from_secs(self.scan_interval_seconds),
            store: SignalStoreConfig {
                seen_capacity: self.seen_signal_capacity,
                seen_retain: self.seen_signal_retain,
                visible_capacity: self.visible_signal_capacity,
            },
        }
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_u64(key: &str, default: u64) -> Result<u64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<u64>()
            .context(format!("Failed to parse {}", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_engine_defaults() {
        let config = ScreenerEnvConfig::default();
        let screener = config.screener_config();
        let defaults = ScreenerConfig::default();

        assert_eq!(screener.batch_size, defaults.batch_size);
        assert_eq!(screener.batch_delay, defaults.batch_delay);
        assert_eq!(screener.scan_interval, defaults.scan_interval);
        assert_eq!(screener.store, defaults.store);

        let analyzer = config.analyzer_config();
        assert_eq!(analyzer.cross_timeframes, Timeframe::confirmation_set());
        assert_eq!(analyzer.strong_threshold, 2);
    }

    #[test]
    fn test_validation() {
        let mut config = ScreenerEnvConfig::default();
        assert!(config.validate().is_ok());

        config.seen_signal_retain = 2000;
        assert!(config.validate().is_err());

        let config = ScreenerEnvConfig {
            batch_size: 0,
            ..ScreenerEnvConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
