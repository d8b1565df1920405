pub mod analyzer;
pub mod screener;
pub mod signal_store;

pub use analyzer::{AnalyzerConfig, SymbolAnalyzer};
pub use screener::{ScanOutcome, ScanReport, ScreenerConfig, ScreeningEngine};
pub use signal_store::{SignalStore, SignalStoreConfig};
