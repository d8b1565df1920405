// Agent modules - per-symbol analysis and the screening loop
pub mod agents;

// Indicator math over close-price series
pub mod indicators;

// Cross-timeframe candle alignment
pub mod market_data;

// Signal detection rules
pub mod signals;
