// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::engine::RuleBinding;
use crate::engine::debounce::Debouncer;
use crate::engine::queue::TriggerQueue;
use crate::types::{TaskName, TaskOutcome};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a run of this task.
    Dispatch(TaskName),
    /// The task finished successfully; signal the notification sink.
    Reload(TaskName),
}

/// Decision returned by the core after handling a single `WatchEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// A watched path changed: (re)arm the rule's debounce window.
pub fn handle_path_changed(
    rules: &[RuleBinding],
    debouncer: &mut Debouncer,
    rule: usize,
    path: &str,
    now: Instant,
) -> CoreStep {
    match rules.get(rule) {
        Some(binding) => {
            debug!(rule, task = %binding.task, path = %path, "change observed");
            debouncer.record(rule, now, binding.debounce);
        }
        None => warn!(rule, path = %path, "change for unknown watch rule ignored"),
    }
    CoreStep::continue_with(Vec::new())
}

/// Fire every rule whose window has elapsed.
///
/// Rules bound to the same task collapse into one trigger. A task that is
/// idle is dispatched; a task in flight gets a queued follow-up run instead.
pub fn handle_debounce_elapsed(
    rules: &[RuleBinding],
    debouncer: &mut Debouncer,
    queue: &mut TriggerQueue,
    in_flight: &mut HashSet<TaskName>,
    now: Instant,
) -> CoreStep {
    let mut commands = Vec::new();
    let mut fired: Vec<&TaskName> = Vec::new();

    for binding in debouncer.take_due(now).into_iter().filter_map(|rule| rules.get(rule)) {
        if !fired.contains(&&binding.task) {
            fired.push(&binding.task);
        }
    }

    for task in fired {
        if in_flight.contains(task) {
            debug!(task = %task, "task still running; queueing trigger");
            queue.record_trigger(task);
        } else {
            info!(task = %task, "change detected; running task");
            in_flight.insert(task.clone());
            commands.push(CoreCommand::Dispatch(task.clone()));
        }
    }

    CoreStep::continue_with(commands)
}

/// A dispatched task settled: reload on success, then start the next queued
/// run of the same task, if any.
pub fn handle_task_completed(
    queue: &mut TriggerQueue,
    in_flight: &mut HashSet<TaskName>,
    task: TaskName,
    outcome: TaskOutcome,
) -> CoreStep {
    let mut commands = Vec::new();

    if !in_flight.remove(&task) {
        warn!(task = %task, "completion for a task that was not in flight");
    }

    match outcome {
        TaskOutcome::Success => commands.push(CoreCommand::Reload(task.clone())),
        TaskOutcome::Failed => {
            warn!(task = %task, "triggered run failed; still watching")
        }
    }

    if queue.take(&task) {
        debug!(task = %task, "starting queued run");
        in_flight.insert(task.clone());
        commands.push(CoreCommand::Dispatch(task));
    }

    CoreStep::continue_with(commands)
}
