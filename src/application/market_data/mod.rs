// Market data processing modules
pub mod timeframe_aligner;

pub use timeframe_aligner::find_enclosing_candle;
