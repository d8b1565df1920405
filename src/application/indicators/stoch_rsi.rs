use super::{IndicatorSeries, ensure_len, ensure_period, rsi, sma};
use crate::domain::errors::IndicatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StochRsiParams {
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub k_period: usize,
    pub d_period: usize,
}

impl Default for StochRsiParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            stoch_period: 14,
            k_period: 3,
            d_period: 3,
        }
    }
}

/// Raw StochRSI plus its %K / %D smoothing lines.
///
/// Offsets refer to the original price input. `k` and `d` are `None` when
/// the raw series is too short to smooth.
#[derive(Debug, Clone, PartialEq)]
pub struct StochRsiOutput {
    pub stoch_rsi: IndicatorSeries,
    pub k: Option<IndicatorSeries>,
    pub d: Option<IndicatorSeries>,
}

pub fn stoch_rsi(
    prices: &[f64],
    params: StochRsiParams,
) -> Result<StochRsiOutput, IndicatorError> {
    ensure_period("StochRSI", params.stoch_period)?;

    let rsi = rsi(prices, params.rsi_period)?;
    ensure_len("StochRSI", rsi.len(), params.stoch_period)?;

    let raw: Vec<f64> = rsi
        .values()
        .windows(params.stoch_period)
        .map(|window| {
            let min = window.iter().copied().fold(f64::INFINITY, f64::min);
            let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let last = window[window.len() - 1];
            // Flat RSI window
            if max == min {
                0.0
            } else {
                (last - min) / (max - min) * 100.0
            }
        })
        .collect();

    let stoch_rsi = IndicatorSeries::new(raw, rsi.offset() + params.stoch_period - 1);
    let k = smooth(&stoch_rsi, params.k_period)?;
    let d = match &k {
        Some(k) => smooth(k, params.d_period)?,
        None => None,
    };

    Ok(StochRsiOutput { stoch_rsi, k, d })
}

fn smooth(
    series: &IndicatorSeries,
    period: usize,
) -> Result<Option<IndicatorSeries>, IndicatorError> {
    match sma(series.values(), period) {
        Ok(smoothed) => Ok(Some(smoothed.shifted(series.offset()))),
        Err(e) if e.is_insufficient_data() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_rsi_history() {
        // 28 prices -> 13 RSI values < stoch period 14
        let prices: Vec<f64> = (0..28).map(|i| 100.0 + (i % 4) as f64).collect();
        let err = stoch_rsi(&prices, StochRsiParams::default()).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_minimum_length_has_no_smoothing_lines() {
        let prices: Vec<f64> = (0..29).map(|i| 100.0 + (i % 4) as f64).collect();
        let out = stoch_rsi(&prices, StochRsiParams::default()).unwrap();
        assert_eq!(out.stoch_rsi.len(), 1);
        assert!(out.k.is_none());
        assert!(out.d.is_none());
    }

    #[test]
    fn test_lengths_and_offsets() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + ((i * 7) % 5) as f64).collect();
        let out = stoch_rsi(&prices, StochRsiParams::default()).unwrap();
        let k = out.k.unwrap();
        let d = out.d.unwrap();

        assert_eq!(out.stoch_rsi.len(), 12);
        assert_eq!(out.stoch_rsi.offset(), 27);
        assert_eq!(k.len(), 10);
        assert_eq!(k.offset(), 29);
        assert_eq!(d.len(), 8);
        assert_eq!(d.offset(), 31);
        // Same input index as the raw series' last value
        assert_eq!(d.price_index(d.len() - 1), out.stoch_rsi.price_index(11));
    }

    #[test]
    fn test_flat_window_is_zero_not_nan() {
        // Steady climb keeps RSI pinned at 100
        let prices: Vec<f64> = (0..40).map(|i| 10.0 + i as f64).collect();
        let out = stoch_rsi(&prices, StochRsiParams::default()).unwrap();
        assert!(out.stoch_rsi.values().iter().all(|&v| v == 0.0));
        assert!(out.k.unwrap().values().iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_turn_after_decline_pushes_k_over_d() {
        // Decline, then one up-step two bars from the end
        let mut prices: Vec<f64> = (0..38).map(|i| 200.0 - i as f64).collect();
        prices.push(168.0);
        prices.push(500.0);

        let out = stoch_rsi(&prices, StochRsiParams::default()).unwrap();
        assert_eq!(out.stoch_rsi.last(), Some(100.0));

        let k = out.k.unwrap();
        let d = out.d.unwrap();
        assert!((k.last().unwrap() - 100.0 / 3.0).abs() < 1e-9);
        assert!((d.last().unwrap() - 100.0 / 9.0).abs() < 1e-9);
    }
}
