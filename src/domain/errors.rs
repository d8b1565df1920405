use thiserror::Error;

/// Errors produced by the indicator math
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("Insufficient data for {indicator}: need {required} values, got {actual}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Invalid period for {indicator}: period must be at least 1")]
    InvalidPeriod { indicator: &'static str },
}

impl IndicatorError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, IndicatorError::InsufficientData { .. })
    }
}

/// Errors related to timeframe codes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeframeError {
    #[error("Unknown timeframe: '{0}'. Valid options: 5, 15, 60, 240, D")]
    Unknown(String),
}

/// Errors related to market data retrieval
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Exchange API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    #[error("Invalid market data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },
}

/// Errors related to outbound notifications
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notifier not configured: {reason}")]
    NotConfigured { reason: String },

    #[error("Notification API error: {description}")]
    Api { description: String },
}
