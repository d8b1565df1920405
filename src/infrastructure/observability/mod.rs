//! Push-based observability for the screener
//!
//! Signal snapshots are written to stdout as structured JSON after every
//! scan cycle (for Loki, Fluentd, CloudWatch). Nothing listens for requests.

pub mod reporter;

pub use reporter::SignalReporter;
