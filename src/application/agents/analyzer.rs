use crate::application::indicators::{MacdParams, StochRsiParams, macd, stoch_rsi};
use crate::application::market_data::find_enclosing_candle;
use crate::application::signals::{
    detect_macd_bullish_cross, detect_stoch_rsi_bullish_cross, price_above_sma,
};
use crate::domain::errors::IndicatorError;
use crate::domain::market::candle::{Candle, closes};
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::MarketDataService;
use crate::domain::signal::{CrossKind, Signal, SignalStrength};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Timeframe whose MACD flip triggers a signal
    pub primary_timeframe: Timeframe,
    pub primary_limit: usize,
    pub primary_min_candles: usize,
    /// Timeframe carrying the StochRSI and moving-average filters
    pub confirmation_timeframe: Timeframe,
    pub confirmation_limit: usize,
    pub confirmation_min_candles: usize,
    pub ma_period: usize,
    /// Timeframes checked for a MACD flip at the primary candle's open time
    pub cross_timeframes: Vec<Timeframe>,
    pub cross_limit: usize,
    pub cross_min_candles: usize,
    /// Confirmed timeframes needed for a strong signal
    pub strong_threshold: usize,
    pub macd: MacdParams,
    pub stoch_rsi: StochRsiParams,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            primary_timeframe: Timeframe::FourHour,
            primary_limit: 100,
            primary_min_candles: 50,
            confirmation_timeframe: Timeframe::OneDay,
            confirmation_limit: 50,
            confirmation_min_candles: 30,
            ma_period: 10,
            cross_timeframes: Timeframe::confirmation_set(),
            cross_limit: 100,
            cross_min_candles: 50,
            strong_threshold: 2,
            macd: MacdParams::default(),
            stoch_rsi: StochRsiParams::default(),
        }
    }
}

/// Runs the full detection pipeline for one symbol.
///
/// Holds no state between calls. Every failure ends the analysis of that
/// symbol with "no signal"; nothing is propagated to the caller.
pub struct SymbolAnalyzer {
    market_data: Arc<dyn MarketDataService>,
    config: AnalyzerConfig,
}

impl SymbolAnalyzer {
    pub fn new(market_data: Arc<dyn MarketDataService>, config: AnalyzerConfig) -> Self {
        Self {
            market_data,
            config,
        }
    }

    pub async fn analyze(&self, symbol: &str) -> Option<Signal> {
        match self.try_analyze(symbol).await {
            Ok(signal) => signal,
            Err(e) => {
                warn!("SymbolAnalyzer: Error analyzing {}: {:#}", symbol, e);
                None
            }
        }
    }

    async fn try_analyze(&self, symbol: &str) -> Result<Option<Signal>> {
        let cfg = &self.config;

        // 1. Primary timeframe MACD flip
        let primary = self
            .fetch(symbol, cfg.primary_timeframe, cfg.primary_limit)
            .await?;
        if primary.len() < cfg.primary_min_candles {
            debug!(
                "SymbolAnalyzer: {} has only {} {} candles",
                symbol,
                primary.len(),
                cfg.primary_timeframe
            );
            return Ok(None);
        }
        let Some(primary_macd) = available(macd(&closes(&primary), cfg.macd))? else {
            return Ok(None);
        };
        let Some(macd_signal) = detect_macd_bullish_cross(primary_macd.histogram.values()) else {
            return Ok(None);
        };
        let candle_4h_time = primary[primary.len() - 1].timestamp;

        // 2. StochRSI crossing on the confirmation timeframe
        let confirmation = self
            .fetch(symbol, cfg.confirmation_timeframe, cfg.confirmation_limit)
            .await?;
        if confirmation.len() < cfg.confirmation_min_candles {
            debug!(
                "SymbolAnalyzer: {} has only {} {} candles",
                symbol,
                confirmation.len(),
                cfg.confirmation_timeframe
            );
            return Ok(None);
        }
        let confirmation_closes = closes(&confirmation);
        let Some(stoch) = available(stoch_rsi(&confirmation_closes, cfg.stoch_rsi))? else {
            return Ok(None);
        };
        let (Some(k), Some(d)) = (&stoch.k, &stoch.d) else {
            return Ok(None);
        };
        let Some(stoch_rsi_signal) = detect_stoch_rsi_bullish_cross(k.values(), d.values())
        else {
            return Ok(None);
        };

        // 3. Trend filter
        if !price_above_sma(&confirmation_closes, cfg.ma_period) {
            debug!(
                "SymbolAnalyzer: {} StochRSI crossed but price is below SMA{}",
                symbol, cfg.ma_period
            );
            return Ok(None);
        }

        let Some(ticker) = self
            .market_data
            .get_ticker(symbol)
            .await
            .with_context(|| format!("Failed to fetch ticker for {}", symbol))?
        else {
            debug!("SymbolAnalyzer: No ticker for {}", symbol);
            return Ok(None);
        };

        // 4. Cross-timeframe confirmation
        let confirmed_timeframes = self.confirm_across_timeframes(symbol, candle_4h_time).await;
        let strength =
            SignalStrength::from_confirmations(confirmed_timeframes.len(), cfg.strong_threshold);

        info!(
            "SymbolAnalyzer: {} {} signal (MACD red bars: {}, StochRSI K={:.2}, confirmed: {:?})",
            symbol, strength, macd_signal.strength, stoch_rsi_signal.k, confirmed_timeframes
        );

        Ok(Some(Signal {
            symbol: symbol.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            price: ticker.last_price,
            price_change_24h: ticker.price_change_24h,
            volume_24h: ticker.volume_24h,
            strength,
            confirmed_timeframes,
            macd_signal,
            stoch_rsi_signal,
            price_above_ma: true,
            candle_4h_time,
        }))
    }

    /// Timeframes whose MACD histogram flipped bullish on the candle that was
    /// open at `target_ms`. A failure on one timeframe only drops that one.
    async fn confirm_across_timeframes(&self, symbol: &str, target_ms: i64) -> Vec<Timeframe> {
        let mut confirmed = Vec::new();

        for &timeframe in &self.config.cross_timeframes {
            match self.confirms_on(symbol, timeframe, target_ms).await {
                Ok(true) => confirmed.push(timeframe),
                Ok(false) => {}
                Err(e) => warn!(
                    "SymbolAnalyzer: {} confirmation check failed for {}: {:#}",
                    timeframe, symbol, e
                ),
            }
        }

        confirmed
    }

    async fn confirms_on(&self, symbol: &str, timeframe: Timeframe, target_ms: i64) -> Result<bool> {
        let cfg = &self.config;
        let candles = self.fetch(symbol, timeframe, cfg.cross_limit).await?;
        if candles.len() < cfg.cross_min_candles {
            return Ok(false);
        }

        let Some(out) = available(macd(&closes(&candles), cfg.macd))? else {
            return Ok(false);
        };
        let Some((index, _)) = find_enclosing_candle(&candles, target_ms, timeframe) else {
            return Ok(false);
        };
        if index < 2 {
            return Ok(false);
        }
        let Some(histogram) = out.histogram.up_to_price(index) else {
            return Ok(false);
        };

        Ok(detect_macd_bullish_cross(histogram)
            .is_some_and(|cross| cross.kind == CrossKind::BullishCross))
    }

    async fn fetch(&self, symbol: &str, timeframe: Timeframe, limit: usize) -> Result<Vec<Candle>> {
        self.market_data
            .get_candles(symbol, timeframe, limit)
            .await
            .with_context(|| format!("Failed to fetch {} candles for {}", timeframe, symbol))
    }
}

/// Maps "not enough data" to an absent result and keeps real errors.
fn available<T>(result: Result<T, IndicatorError>) -> Result<Option<T>, IndicatorError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_insufficient_data() => Ok(None),
        Err(e) => Err(e),
    }
}
