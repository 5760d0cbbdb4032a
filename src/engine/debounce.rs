// src/engine/debounce.rs

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::debug;

/// Trailing-edge debouncer keyed by watch rule index.
///
/// Every change pushes the rule's deadline to `now + window`; the rule fires
/// once, when a full window has passed without another change.
#[derive(Debug, Default)]
pub struct Debouncer {
    deadlines: BTreeMap<usize, Instant>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change for `rule` observed at `now`.
    pub fn record(&mut self, rule: usize, now: Instant, window: Duration) {
        let deadline = now + window;
        let restarted = self.deadlines.insert(rule, deadline).is_some();
        debug!(rule, restarted, window_ms = window.as_millis() as u64, "debounce window armed");
    }

    /// Remove and return every rule whose deadline is at or before `now`,
    /// in rule order.
    pub fn take_due(&mut self, now: Instant) -> Vec<usize> {
        let due: Vec<usize> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(rule, _)| *rule)
            .collect();
        for rule in &due {
            self.deadlines.remove(rule);
        }
        due
    }

    /// Earliest pending deadline, if any rule is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
