use crate::domain::errors::TimeframeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle granularities known to the screener.
///
/// This is the single table mapping timeframe codes to durations; both the
/// exchange client and the cross-timeframe aligner read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    FiveMin,
    #[serde(rename = "15m")]
    FifteenMin,
    #[serde(rename = "60m")]
    OneHour,
    #[serde(rename = "4h")]
    FourHour,
    #[serde(rename = "1D")]
    OneDay,
}

impl Timeframe {
    /// Returns the duration of this timeframe in minutes
    pub fn to_minutes(&self) -> usize {
        match self {
            Timeframe::FiveMin => 5,
            Timeframe::FifteenMin => 15,
            Timeframe::OneHour => 60,
            Timeframe::FourHour => 240,
            Timeframe::OneDay => 1440,
        }
    }

    /// Returns the duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.to_minutes() * 60_000) as i64
    }

    /// Converts to the Bybit v5 kline interval code
    pub fn to_bybit_interval(&self) -> &'static str {
        match self {
            Timeframe::FiveMin => "5",
            Timeframe::FifteenMin => "15",
            Timeframe::OneHour => "60",
            Timeframe::FourHour => "240",
            Timeframe::OneDay => "D",
        }
    }

    /// Human-readable label used in signal records and alerts
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::FiveMin => "5m",
            Timeframe::FifteenMin => "15m",
            Timeframe::OneHour => "60m",
            Timeframe::FourHour => "4h",
            Timeframe::OneDay => "1D",
        }
    }

    /// Timeframes checked for cross-timeframe confirmation of a 4H signal
    pub fn confirmation_set() -> Vec<Timeframe> {
        vec![
            Timeframe::FiveMin,
            Timeframe::FifteenMin,
            Timeframe::OneHour,
            Timeframe::OneDay,
        ]
    }

    /// Returns the start timestamp of the period containing the given timestamp
    ///
    /// Periods are aligned to the Unix epoch, so daily candles start at
    /// midnight UTC.
    pub fn period_start(&self, timestamp_ms: i64) -> i64 {
        timestamp_ms - timestamp_ms.rem_euclid(self.duration_ms())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "5" | "5m" | "5min" => Ok(Timeframe::FiveMin),
            "15" | "15m" | "15min" => Ok(Timeframe::FifteenMin),
            "60" | "60m" | "1h" | "1hour" => Ok(Timeframe::OneHour),
            "240" | "4h" | "4hour" => Ok(Timeframe::FourHour),
            "d" | "1d" | "1day" => Ok(Timeframe::OneDay),
            _ => Err(TimeframeError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
