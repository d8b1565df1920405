use super::{IndicatorSeries, ensure_len, ensure_period};
use crate::domain::errors::IndicatorError;

/// Simple moving average over trailing windows of `period` prices.
pub fn sma(prices: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("SMA", period)?;
    ensure_len("SMA", prices.len(), period)?;

    let values = prices
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect();

    Ok(IndicatorSeries::new(values, period - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data() {
        assert!(sma(&[1.0, 2.0], 3).unwrap_err().is_insufficient_data());
    }

    #[test]
    fn test_length_and_offset() {
        let prices: Vec<f64> = (1..=10).map(f64::from).collect();
        let series = sma(&prices, 4).unwrap();
        assert_eq!(series.len(), 7);
        assert_eq!(series.offset(), 3);
        assert_eq!(series.values()[0], 2.5);
        assert_eq!(series.last(), Some(8.5));
    }

    #[test]
    fn test_minimum_length_yields_single_value() {
        let series = sma(&[2.0, 4.0, 6.0], 3).unwrap();
        assert_eq!(series.values(), &[4.0]);
    }
}
