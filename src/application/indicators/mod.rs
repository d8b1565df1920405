//! Indicator math over oldest-first close-price series.
//!
//! Every function returns an [`IndicatorSeries`] (or a bundle of them) that
//! records where its first value sits in the input, so callers never have to
//! recompute warm-up lengths by hand. Too-short input yields
//! [`IndicatorError::InsufficientData`] instead of a panic.

mod ema;
mod macd;
mod rsi;
mod series;
mod sma;
mod stoch_rsi;

pub use ema::ema;
pub use macd::{MacdOutput, MacdParams, macd};
pub use rsi::rsi;
pub use series::IndicatorSeries;
pub use sma::sma;
pub use stoch_rsi::{StochRsiOutput, StochRsiParams, stoch_rsi};

use crate::domain::errors::IndicatorError;

fn ensure_period(indicator: &'static str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { indicator });
    }
    Ok(())
}

fn ensure_len(
    indicator: &'static str,
    actual: usize,
    required: usize,
) -> Result<(), IndicatorError> {
    if actual < required {
        return Err(IndicatorError::InsufficientData {
            indicator,
            required,
            actual,
        });
    }
    Ok(())
}
