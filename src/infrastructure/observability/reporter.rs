//! JSON signal reporter
//!
//! Emits the visible signal list as one `SIGNALS_JSON:` line per scan cycle.

use crate::domain::ports::SignalSubscriber;
use crate::domain::signal::Signal;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

/// Signal snapshot for JSON output
#[derive(Serialize)]
pub struct SignalSnapshot<'a> {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub total: usize,
    pub strong: usize,
    pub weak: usize,
    pub signals: &'a [Signal],
}

pub struct SignalReporter {
    start_time: Instant,
}

impl Default for SignalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalReporter {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn snapshot<'a>(&self, signals: &'a [Signal]) -> SignalSnapshot<'a> {
        let strong = signals.iter().filter(|s| s.is_strong()).count();
        SignalSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            total: signals.len(),
            strong,
            weak: signals.len() - strong,
            signals,
        }
    }
}

impl SignalSubscriber for SignalReporter {
    fn on_signals(&self, signals: &[Signal]) {
        let snapshot = self.snapshot(signals);
        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                // Prefixed so log shippers can pick the line out
                println!("SIGNALS_JSON:{}", json);
                info!(
                    "Signals: {} visible | Strong: {} | Weak: {} | Uptime: {}s",
                    snapshot.total, snapshot.strong, snapshot.weak, snapshot.uptime_seconds
                );
            }
            Err(e) => warn!("Failed to serialize signals: {}", e),
        }
    }
}
