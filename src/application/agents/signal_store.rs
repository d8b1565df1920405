use crate::domain::signal::{Signal, SignalKey};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalStoreConfig {
    /// Seen identities kept before trimming
    pub seen_capacity: usize,
    /// Newest identities kept after a trim
    pub seen_retain: usize,
    /// Signals kept in the visible list
    pub visible_capacity: usize,
}

impl Default for SignalStoreConfig {
    fn default() -> Self {
        Self {
            seen_capacity: 1000,
            seen_retain: 500,
            visible_capacity: 100,
        }
    }
}

/// Dedup history plus the visible, newest-first signal list.
///
/// Owned by the screening engine and only touched between batches of a scan
/// cycle.
#[derive(Debug)]
pub struct SignalStore {
    config: SignalStoreConfig,
    seen: HashSet<SignalKey>,
    /// Insertion order of `seen`, oldest at the front
    seen_order: VecDeque<SignalKey>,
    visible: Vec<Signal>,
}

impl Default for SignalStore {
    fn default() -> Self {
        Self::new(SignalStoreConfig::default())
    }
}

impl SignalStore {
    pub fn new(mut config: SignalStoreConfig) -> Self {
        config.seen_retain = config.seen_retain.min(config.seen_capacity);
        Self {
            config,
            seen: HashSet::new(),
            seen_order: VecDeque::new(),
            visible: Vec::new(),
        }
    }

    /// Records a scan's findings and returns the ones not seen before, in
    /// their original order. Those are prepended to the visible list.
    pub fn ingest(&mut self, signals: Vec<Signal>) -> Vec<Signal> {
        let fresh: Vec<Signal> = signals
            .into_iter()
            .filter(|signal| self.remember(signal.key()))
            .collect();

        if !fresh.is_empty() {
            let mut visible = fresh.clone();
            visible.append(&mut self.visible);
            visible.truncate(self.config.visible_capacity);
            self.visible = visible;
        }

        fresh
    }

    /// Visible signals, strong first, newest first within each strength.
    pub fn ranked(&self) -> Vec<Signal> {
        let mut signals = self.visible.clone();
        signals.sort_by(Signal::rank_cmp);
        signals
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    fn remember(&mut self, key: SignalKey) -> bool {
        if !self.seen.insert(key.clone()) {
            debug!("SignalStore: Dropping duplicate signal {}", key);
            return false;
        }
        self.seen_order.push_back(key);

        if self.seen_order.len() > self.config.seen_capacity {
            let excess = self.seen_order.len() - self.config.seen_retain;
            for old in self.seen_order.drain(..excess) {
                self.seen.remove(&old);
            }
            debug!(
                "SignalStore: Trimmed {} old identities, {} kept",
                excess,
                self.seen_order.len()
            );
        }

        true
    }
}
