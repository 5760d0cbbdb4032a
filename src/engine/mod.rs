// src/engine/mod.rs

//! Watch-mode orchestration engine.
//!
//! The engine turns filesystem matches into task runs:
//! - changes are debounced per watch rule (trailing edge)
//! - a rule whose window elapses dispatches its bound task
//! - a task that is still in flight never gets a second concurrent run;
//!   further triggers are parked in the [`TriggerQueue`] and replayed when
//!   the current run settles
//! - a successful run asks the notification sink to reload
//!
//! The pure state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::time::Duration;

use crate::types::{TaskName, TaskOutcome};

/// A watch rule as seen by the engine: which task it triggers and how long
/// its debounce window is. Rules are addressed by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBinding {
    pub task: TaskName,
    pub debounce: Duration,
}

impl RuleBinding {
    pub fn new(task: impl Into<TaskName>, debounce: Duration) -> Self {
        Self {
            task: task.into(),
            debounce,
        }
    }
}

/// Events flowing into the engine from the watcher, the executor and the
/// shutdown handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A path matching rule number `rule` changed.
    PathChanged { rule: usize, path: String },
    /// The earliest debounce deadline has passed.
    DebounceElapsed,
    /// A dispatched task settled.
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod debounce;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use debounce::Debouncer;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
