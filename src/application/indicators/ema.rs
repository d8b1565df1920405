use super::{IndicatorSeries, ensure_len, ensure_period};
use crate::domain::errors::IndicatorError;

/// Exponential moving average, `k = 2 / (period + 1)`.
///
/// Seeded with the first price rather than an SMA of the first `period`
/// values, so early values lean towards `prices[0]`. The period only gates
/// availability: output has one value per input (offset 0).
pub fn ema(prices: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("EMA", period)?;
    ensure_len("EMA", prices.len(), period)?;

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(prices.len());
    let mut prev = prices[0];
    values.push(prev);

    for &price in &prices[1..] {
        prev = price * k + prev * (1.0 - k);
        values.push(prev);
    }

    Ok(IndicatorSeries::new(values, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data() {
        let err = ema(&[1.0, 2.0], 3).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                indicator: "EMA",
                required: 3,
                actual: 2
            }
        );
        assert!(ema(&[], 1).is_err());
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(matches!(
            ema(&[1.0], 0),
            Err(IndicatorError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_minimum_length_keeps_every_value() {
        let series = ema(&[1.0, 2.0, 3.0], 3).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.offset(), 0);
    }

    #[test]
    fn test_seeded_with_first_price() {
        // k = 0.5
        let series = ema(&[10.0, 20.0, 20.0], 3).unwrap();
        assert_eq!(series.values(), &[10.0, 15.0, 17.5]);
    }
}
