pub mod rules;

pub use rules::{detect_macd_bullish_cross, detect_stoch_rsi_bullish_cross, price_above_sma};
