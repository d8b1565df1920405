use crate::application::indicators::sma;
use crate::domain::signal::{CrossKind, MacdCross, StochRsiCross};

/// %K at or above this level is treated as overbought and never fires
pub const STOCH_OVERBOUGHT: f64 = 80.0;
/// %K below this level marks the crossing as oversold
pub const STOCH_OVERSOLD: f64 = 20.0;

/// Fires on the first positive histogram bar after one or more
/// non-positive bars.
pub fn detect_macd_bullish_cross(histogram: &[f64]) -> Option<MacdCross> {
    if histogram.len() < 3 {
        return None;
    }

    let current = histogram[histogram.len() - 1];
    let previous = histogram[histogram.len() - 2];

    if current > 0.0 && previous <= 0.0 {
        let strength = histogram[..histogram.len() - 1]
            .iter()
            .rev()
            .take_while(|&&h| h <= 0.0)
            .count();

        return Some(MacdCross {
            kind: CrossKind::BullishCross,
            strength,
            current,
            previous,
        });
    }

    None
}

/// Fires when %K crosses above %D on the latest bar below the overbought
/// zone.
pub fn detect_stoch_rsi_bullish_cross(k: &[f64], d: &[f64]) -> Option<StochRsiCross> {
    if k.len() < 2 || d.len() < 2 {
        return None;
    }

    let current_k = k[k.len() - 1];
    let previous_k = k[k.len() - 2];
    let current_d = d[d.len() - 1];
    let previous_d = d[d.len() - 2];

    if previous_k <= previous_d && current_k > current_d && current_k < STOCH_OVERBOUGHT {
        return Some(StochRsiCross {
            kind: CrossKind::BullishCross,
            k: current_k,
            d: current_d,
            oversold: current_k < STOCH_OVERSOLD,
        });
    }

    None
}

/// Last price strictly above the last `period` SMA. False when there is not
/// enough data.
pub fn price_above_sma(prices: &[f64], period: usize) -> bool {
    let (Some(&price), Ok(average)) = (prices.last(), sma(prices, period)) else {
        return false;
    };

    average.last().is_some_and(|ma| price > ma)
}
