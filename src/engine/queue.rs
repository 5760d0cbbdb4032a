// src/engine/queue.rs

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::types::TaskName;

/// Pending re-runs for tasks that were triggered while already in flight.
///
/// Each task keeps its own counter, capped at `max_runs` (the configured
/// `queue_length`). With the default of 1, any number of triggers during a
/// run collapse into exactly one follow-up run.
#[derive(Debug)]
pub struct TriggerQueue {
    max_runs: usize,
    pending: BTreeMap<TaskName, usize>,
}

impl TriggerQueue {
    /// `max_runs` is clamped to at least 1.
    pub fn new(max_runs: usize) -> Self {
        Self {
            max_runs: max_runs.max(1),
            pending: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of queued runs for `task`.
    pub fn pending_for(&self, task: &str) -> usize {
        self.pending.get(task).copied().unwrap_or(0)
    }

    /// Queue a follow-up run of `task`. Returns false when the queue for this
    /// task is already full and the trigger was coalesced away.
    pub fn record_trigger(&mut self, task: &str) -> bool {
        let count = self.pending.entry(task.to_string()).or_insert(0);
        if *count >= self.max_runs {
            warn!(
                task = %task,
                max_runs = self.max_runs,
                "queue full; coalescing trigger into already queued run"
            );
            return false;
        }
        *count += 1;
        debug!(task = %task, queued = *count, "queued follow-up run");
        true
    }

    /// Take one queued run of `task`, if any.
    pub fn take(&mut self, task: &str) -> bool {
        match self.pending.get_mut(task) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.pending.remove(task);
                true
            }
            None => false,
        }
    }
}
