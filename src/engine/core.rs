// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`WatchEvent`]s together with the current instant and
//! produces a list of commands for the IO shell. It owns no channels, timers
//! or processes, so every debounce and queueing decision can be tested by
//! feeding it events with hand-picked instants.

use std::collections::HashSet;
use std::time::Instant;

use crate::engine::debounce::Debouncer;
use crate::engine::event_handlers::{
    CoreStep, handle_debounce_elapsed, handle_path_changed, handle_task_completed,
};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuleBinding, WatchEvent};
use crate::types::TaskName;

#[derive(Debug)]
pub struct CoreRuntime {
    rules: Vec<RuleBinding>,
    debouncer: Debouncer,
    queue: TriggerQueue,
    in_flight: HashSet<TaskName>,
}

impl CoreRuntime {
    pub fn new(rules: Vec<RuleBinding>, queue_length: usize) -> Self {
        Self {
            rules,
            debouncer: Debouncer::new(),
            queue: TriggerQueue::new(queue_length),
            in_flight: HashSet::new(),
        }
    }

    pub fn rules(&self) -> &[RuleBinding] {
        &self.rules
    }

    /// Earliest instant at which a `DebounceElapsed` event is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    pub fn is_running(&self, task: &str) -> bool {
        self.in_flight.contains(task)
    }

    /// True when nothing is armed, running or queued.
    pub fn is_idle(&self) -> bool {
        self.debouncer.is_empty() && self.in_flight.is_empty() && self.queue.is_empty()
    }

    pub fn queued_runs(&self, task: &str) -> usize {
        self.queue.pending_for(task)
    }

    /// Handle a single event observed at `now`.
    pub fn step(&mut self, event: WatchEvent, now: Instant) -> CoreStep {
        match event {
            WatchEvent::PathChanged { rule, path } => {
                handle_path_changed(&self.rules, &mut self.debouncer, rule, &path, now)
            }
            WatchEvent::DebounceElapsed => handle_debounce_elapsed(
                &self.rules,
                &mut self.debouncer,
                &mut self.queue,
                &mut self.in_flight,
                now,
            ),
            WatchEvent::TaskCompleted { task, outcome } => {
                handle_task_completed(&mut self.queue, &mut self.in_flight, task, outcome)
            }
            WatchEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
