use crate::domain::market::candle::{Candle, Ticker};
use crate::domain::market::timeframe::Timeframe;
use crate::domain::signal::Signal;
use anyhow::Result;
use async_trait::async_trait;

/// Source of instruments, candles and tickers.
#[async_trait]
pub trait MarketDataService: Send + Sync {
    async fn list_tradable_symbols(&self) -> Result<Vec<String>>;

    /// Returns up to `limit` most recent candles, oldest first.
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>>;

    async fn get_ticker(&self, symbol: &str) -> Result<Option<Ticker>>;
}

/// Outbound alert channel. Delivery is best effort: callers log failures
/// and carry on.
#[async_trait]
pub trait SignalNotifier: Send + Sync {
    async fn notify_batch(&self, signals: &[Signal]) -> Result<()>;
    async fn notify_error(&self, error: &str) -> Result<()>;
}

/// Observer called with the full visible signal list after every scan cycle.
pub trait SignalSubscriber: Send + Sync {
    fn on_signals(&self, signals: &[Signal]);
}
