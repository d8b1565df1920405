use crate::domain::errors::MarketDataError;
use crate::domain::market::candle::{Candle, Ticker};
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::{MarketDataService, SignalNotifier};
use crate::domain::signal::Signal;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

#[derive(Default)]
struct MockState {
    symbols: Vec<String>,
    candles: HashMap<(String, Timeframe), Vec<Candle>>,
    tickers: HashMap<String, Ticker>,
    failing_candles: HashSet<(String, Timeframe)>,
    listing_fails: bool,
    listing_delay: Option<Duration>,
    candle_requests: Vec<(String, Timeframe)>,
}

/// Scripted market: candles and tickers are whatever the test (or demo)
/// put in. Unknown series come back empty.
#[derive(Clone, Default)]
pub struct MockMarketDataService {
    state: Arc<Mutex<MockState>>,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small market for running the screener without an exchange: one
    /// strong setup, one weak setup and one symbol without a MACD flip.
    pub fn demo() -> Self {
        let mock = Self::new();
        let signal_open = Timeframe::FourHour.period_start(Utc::now().timestamp_millis());
        let daily_open = Timeframe::OneDay.period_start(signal_open);

        let setups: [(&str, &[Timeframe]); 2] = [
            ("DEMOUSDT", &[Timeframe::FiveMin, Timeframe::FifteenMin]),
            ("TESTUSDT", &[Timeframe::OneHour]),
        ];
        for (symbol, confirming) in setups {
            mock.set_candles(
                symbol,
                Timeframe::FourHour,
                candles_ending_at(signal_open, Timeframe::FourHour, &falling_then_spike(100)),
            );
            mock.set_candles(
                symbol,
                Timeframe::OneDay,
                candles_ending_at(daily_open, Timeframe::OneDay, &decline_then_turn(40)),
            );
            for &timeframe in confirming {
                mock.set_candles(
                    symbol,
                    timeframe,
                    candles_ending_at(signal_open, timeframe, &falling_then_spike(100)),
                );
            }
            mock.set_ticker(Ticker {
                symbol: symbol.to_string(),
                last_price: 101.0,
                price_change_24h: 4.2,
                volume_24h: 1_250_000.0,
            });
        }

        mock.set_candles(
            "FLATUSDT",
            Timeframe::FourHour,
            candles_ending_at(signal_open, Timeframe::FourHour, &steady_decline(100)),
        );

        mock.set_symbols(vec![
            "DEMOUSDT".to_string(),
            "TESTUSDT".to_string(),
            "FLATUSDT".to_string(),
        ]);
        info!("MockMarketDataService: Demo market with 3 symbols ready");
        mock
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the scripted data from others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_symbols(&self, symbols: Vec<String>) {
        self.state().symbols = symbols;
    }

    pub fn set_candles(&self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) {
        self.state()
            .candles
            .insert((symbol.to_string(), timeframe), candles);
    }

    pub fn set_ticker(&self, ticker: Ticker) {
        self.state().tickers.insert(ticker.symbol.clone(), ticker);
    }

    pub fn clear_ticker(&self, symbol: &str) {
        self.state().tickers.remove(symbol);
    }

    pub fn fail_candles(&self, symbol: &str, timeframe: Timeframe) {
        self.state()
            .failing_candles
            .insert((symbol.to_string(), timeframe));
    }

    pub fn fail_symbol_listing(&self, fail: bool) {
        self.state().listing_fails = fail;
    }

    pub fn set_listing_delay(&self, delay: Duration) {
        self.state().listing_delay = Some(delay);
    }

    /// Every candle request seen so far, in order
    pub fn candle_requests(&self) -> Vec<(String, Timeframe)> {
        self.state().candle_requests.clone()
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn list_tradable_symbols(&self) -> Result<Vec<String>> {
        let (delay, fails, symbols) = {
            let state = self.state();
            (state.listing_delay, state.listing_fails, state.symbols.clone())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fails {
            return Err(MarketDataError::Transport {
                reason: "mock symbol listing failure".to_string(),
            }
            .into());
        }
        Ok(symbols)
    }

    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let mut state = self.state();
        let key = (symbol.to_string(), timeframe);
        state.candle_requests.push(key.clone());

        if state.failing_candles.contains(&key) {
            return Err(MarketDataError::Transport {
                reason: format!("mock {} candle failure for {}", timeframe, symbol),
            }
            .into());
        }

        let candles = state.candles.get(&key).map_or(&[][..], |c| c.as_slice());
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Option<Ticker>> {
        Ok(self.state().tickers.get(symbol).cloned())
    }
}

/// Notifier that keeps everything it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    batches: Mutex<Vec<Vec<Signal>>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn batches(&self) -> Vec<Vec<Signal>> {
        self.batches.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl SignalNotifier for RecordingNotifier {
    async fn notify_batch(&self, signals: &[Signal]) -> Result<()> {
        self.batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(signals.to_vec());
        Ok(())
    }

    async fn notify_error(&self, error: &str) -> Result<()> {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(error.to_string());
        Ok(())
    }
}

/// Builds consecutive candles on `timeframe` from `closes`, the last one
/// opening at `last_open_ms`.
pub fn candles_ending_at(last_open_ms: i64, timeframe: Timeframe, closes: &[f64]) -> Vec<Candle> {
    let step = timeframe.duration_ms();
    let first_open = last_open_ms - step * closes.len().saturating_sub(1) as i64;
    let mut prev_close = closes.first().copied().unwrap_or_default();

    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let candle = Candle {
                timestamp: first_open + i as i64 * step,
                open: prev_close,
                high: prev_close.max(close),
                low: prev_close.min(close),
                close,
                volume: 1_000.0,
            };
            prev_close = close;
            candle
        })
        .collect()
}

/// Linear decline: the MACD histogram stays non-positive throughout.
pub fn steady_decline(len: usize) -> Vec<f64> {
    (0..len).map(|i| 100.0 - 0.5 * i as f64).collect()
}

/// Linear decline with a jump on the last bar: the histogram turns positive
/// on the last bar only.
pub fn falling_then_spike(len: usize) -> Vec<f64> {
    let mut closes = steady_decline(len.saturating_sub(1));
    let last = closes.last().copied().unwrap_or(100.0);
    closes.push(last + 50.0);
    closes
}

/// Losses only, then an up-move on the second-to-last bar and a close far
/// above the recent average: %K crosses %D (K = 33.3, D = 11.1) and price
/// sits above its 10-bar SMA.
pub fn decline_then_turn(len: usize) -> Vec<f64> {
    let mut closes: Vec<f64> = (0..len.saturating_sub(2))
        .map(|i| 200.0 - i as f64)
        .collect();
    let last = closes.last().copied().unwrap_or(200.0);
    closes.push(last + 5.0);
    closes.push((last + 5.0) * 3.0);
    closes
}

/// One early gain, a long one-point-per-bar decline, a one-point gain on the
/// second-to-last bar and a close far above the recent average: %K crosses
/// %D deep in the oversold zone (K = 14.6, D = 4.9 for 40 bars).
pub fn oversold_rebound(len: usize) -> Vec<f64> {
    let mut closes = vec![100.0, 110.0];
    while closes.len() < len.saturating_sub(2) {
        let last = closes[closes.len() - 1];
        closes.push(last - 1.0);
    }
    let last = closes[closes.len() - 1];
    closes.push(last + 1.0);
    closes.push((last + 1.0) * 3.0);
    closes
}
