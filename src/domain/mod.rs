// Market data domain (candles, tickers, timeframes)
pub mod market;

// Port interfaces
pub mod ports;

// Screening signals and their identity
pub mod signal;

// Domain-specific error types
pub mod errors;
