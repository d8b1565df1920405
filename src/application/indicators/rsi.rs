use super::{IndicatorSeries, ensure_len, ensure_period};
use crate::domain::errors::IndicatorError;

/// Relative Strength Index with Wilder's smoothing.
///
/// Average gain and loss are seeded with the mean of the first `period`
/// price changes. Each step emits a value and then folds in the next change,
/// so the final change only moves the averages: the series starts at input
/// index `period` and holds `len - period - 1` values. A zero average loss
/// reads as 100.
pub fn rsi(prices: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_period("RSI", period)?;
    ensure_len("RSI", prices.len(), period + 1)?;

    let (gains, losses): (Vec<f64>, Vec<f64>) = prices
        .windows(2)
        .map(|pair| {
            let change = pair[1] - pair[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let p = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / p;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / p;

    let mut values = Vec::with_capacity(gains.len() - period);
    for i in period..gains.len() {
        if avg_loss == 0.0 {
            values.push(100.0);
        } else {
            let rs = avg_gain / avg_loss;
            values.push(100.0 - 100.0 / (1.0 + rs));
        }

        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
    }

    Ok(IndicatorSeries::new(values, period))
}
