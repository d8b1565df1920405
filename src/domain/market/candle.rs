use serde::{Deserialize, Serialize};

/// One OHLCV bar. `timestamp` is the candle open time in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Whether `timestamp_ms` falls inside `[open, open + duration_ms)`
    pub fn contains(&self, timestamp_ms: i64, duration_ms: i64) -> bool {
        timestamp_ms >= self.timestamp && timestamp_ms < self.timestamp + duration_ms
    }
}

/// Extracts the close prices of an oldest-first candle series
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Last-traded snapshot of an instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: String,
    pub last_price: f64,
    /// 24h change in percent, e.g. `1.25` for +1.25%. Bybit reports a
    /// fraction (`price24hPcnt`); the client scales it by 100.
    pub price_change_24h: f64,
    pub volume_24h: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(timestamp: i64, close: f64) -> Candle {
        Candle {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_contains_is_half_open() {
        let c = candle(1_000, 1.0);
        assert!(c.contains(1_000, 500));
        assert!(c.contains(1_499, 500));
        assert!(!c.contains(1_500, 500));
        assert!(!c.contains(999, 500));
    }

    #[test]
    fn test_closes() {
        let candles = vec![candle(0, 1.0), candle(1, 2.5), candle(2, 3.0)];
        assert_eq!(closes(&candles), vec![1.0, 2.5, 3.0]);
    }
}
