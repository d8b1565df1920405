use super::{IndicatorSeries, ema, ensure_len};
use crate::domain::errors::IndicatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// MACD line, signal line and histogram. All three share offset 0 because
/// the underlying EMAs keep every input position.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub macd_line: IndicatorSeries,
    pub signal_line: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn macd(prices: &[f64], params: MacdParams) -> Result<MacdOutput, IndicatorError> {
    ensure_len("MACD", prices.len(), params.slow)?;

    let fast = ema(prices, params.fast)?;
    let slow = ema(prices, params.slow)?;

    let line: Vec<f64> = fast
        .values()
        .iter()
        .zip(slow.values())
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema(&line, params.signal)?;
    let histogram: Vec<f64> = line
        .iter()
        .zip(signal_line.values())
        .map(|(m, s)| m - s)
        .collect();

    Ok(MacdOutput {
        macd_line: IndicatorSeries::new(line, 0),
        signal_line,
        histogram: IndicatorSeries::new(histogram, 0),
    })
}
