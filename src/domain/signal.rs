use crate::domain::market::timeframe::Timeframe;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Strong,
    Weak,
}

impl SignalStrength {
    pub fn from_confirmations(confirmed: usize, strong_threshold: usize) -> Self {
        if confirmed >= strong_threshold {
            SignalStrength::Strong
        } else {
            SignalStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStrength::Strong => "strong",
            SignalStrength::Weak => "weak",
        }
    }
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossKind {
    BullishCross,
}

impl fmt::Display for CrossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossKind::BullishCross => f.write_str("bullish_cross"),
        }
    }
}

/// First positive MACD histogram bar after a run of non-positive bars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdCross {
    #[serde(rename = "type")]
    pub kind: CrossKind,
    /// Number of consecutive non-positive bars before the flip
    pub strength: usize,
    pub current: f64,
    pub previous: f64,
}

/// %K crossing above %D outside the overbought zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochRsiCross {
    #[serde(rename = "type")]
    pub kind: CrossKind,
    pub k: f64,
    pub d: f64,
    pub oversold: bool,
}

/// A screening hit. Immutable once emitted by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub symbol: String,
    /// Wall-clock time of the scan that produced the signal (ms)
    pub timestamp: i64,
    pub price: f64,
    /// Percent, not the exchange's raw fraction
    pub price_change_24h: f64,
    pub volume_24h: f64,
    pub strength: SignalStrength,
    pub confirmed_timeframes: Vec<Timeframe>,
    pub macd_signal: MacdCross,
    #[serde(rename = "stochRSISignal")]
    pub stoch_rsi_signal: StochRsiCross,
    #[serde(rename = "priceAboveMA")]
    pub price_above_ma: bool,
    /// Open time of the 4H candle that carried the MACD flip
    pub candle_4h_time: i64,
}

impl Signal {
    pub fn key(&self) -> SignalKey {
        SignalKey {
            symbol: self.symbol.clone(),
            timestamp: self.timestamp,
            strength: self.strength,
        }
    }

    pub fn is_strong(&self) -> bool {
        self.strength == SignalStrength::Strong
    }

    /// Display order: strong before weak, then newest first
    pub fn rank_cmp(&self, other: &Signal) -> Ordering {
        match (self.strength, other.strength) {
            (SignalStrength::Strong, SignalStrength::Weak) => Ordering::Less,
            (SignalStrength::Weak, SignalStrength::Strong) => Ordering::Greater,
            _ => other.timestamp.cmp(&self.timestamp),
        }
    }
}

/// Deduplication identity of a signal.
///
/// Uses the scan timestamp rather than the 4H candle time, so the same
/// market event seen by two scans yields two keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalKey {
    pub symbol: String,
    pub timestamp: i64,
    pub strength: SignalStrength,
}

impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.symbol, self.timestamp, self.strength)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn signal(symbol: &str, timestamp: i64, strength: SignalStrength) -> Signal {
        Signal {
            symbol: symbol.to_string(),
            timestamp,
            price: 1.25,
            price_change_24h: 3.4,
            volume_24h: 1_000_000.0,
            strength,
            confirmed_timeframes: vec![Timeframe::FiveMin],
            macd_signal: MacdCross {
                kind: CrossKind::BullishCross,
                strength: 4,
                current: 0.2,
                previous: -0.1,
            },
            stoch_rsi_signal: StochRsiCross {
                kind: CrossKind::BullishCross,
                k: 25.0,
                d: 22.0,
                oversold: false,
            },
            price_above_ma: true,
            candle_4h_time: 1_704_067_200_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::signal;
    use super::*;

    #[test]
    fn test_strength_threshold() {
        assert_eq!(SignalStrength::from_confirmations(2, 2), SignalStrength::Strong);
        assert_eq!(SignalStrength::from_confirmations(3, 2), SignalStrength::Strong);
        assert_eq!(SignalStrength::from_confirmations(1, 2), SignalStrength::Weak);
        assert_eq!(SignalStrength::from_confirmations(0, 2), SignalStrength::Weak);
    }

    #[test]
    fn test_key_uses_scan_timestamp() {
        let a = signal("BTCUSDT", 1_000, SignalStrength::Weak);
        let b = signal("BTCUSDT", 2_000, SignalStrength::Weak);
        assert_eq!(a.candle_4h_time, b.candle_4h_time);
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key().to_string(), "BTCUSDT_1000_weak");
    }

    #[test]
    fn test_rank_order() {
        let mut signals = vec![
            signal("A", 1, SignalStrength::Weak),
            signal("B", 5, SignalStrength::Strong),
            signal("C", 9, SignalStrength::Weak),
            signal("D", 2, SignalStrength::Strong),
        ];
        signals.sort_by(Signal::rank_cmp);
        let order: Vec<&str> = signals.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(order, vec!["B", "D", "C", "A"]);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(signal("ETHUSDT", 7, SignalStrength::Strong)).unwrap();
        assert_eq!(json["strength"], "strong");
        assert_eq!(json["confirmedTimeframes"][0], "5m");
        assert_eq!(json["macdSignal"]["type"], "bullish_cross");
        assert_eq!(json["stochRSISignal"]["oversold"], false);
        assert_eq!(json["priceAboveMA"], true);
        assert_eq!(json["candle4hTime"], 1_704_067_200_000i64);
    }
}
