// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The watch runtime talks to an `ExecutorBackend` instead of the task graph
//! directly, so tests can swap in a backend that records dispatches and
//! completes them on demand.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::dag::TaskGraph;
use crate::engine::WatchEvent;
use crate::errors::Result;
use crate::types::{BoxFuture, TaskName, TaskOutcome};

/// Trait abstracting how dispatched tasks are executed.
///
/// Implementations must eventually report a `WatchEvent::TaskCompleted` for
/// every dispatched task, otherwise the task stays in flight forever.
pub trait ExecutorBackend: Send {
    fn spawn_task(&mut self, task: TaskName) -> BoxFuture<'_, Result<()>>;
}

/// Production backend: runs the task through the [`TaskGraph`] on a
/// background tokio task and reports the outcome on the runtime channel.
pub struct GraphExecutor {
    graph: Arc<TaskGraph>,
    tx: mpsc::Sender<WatchEvent>,
}

impl GraphExecutor {
    pub fn new(graph: Arc<TaskGraph>, tx: mpsc::Sender<WatchEvent>) -> Self {
        Self { graph, tx }
    }
}

impl ExecutorBackend for GraphExecutor {
    fn spawn_task(&mut self, task: TaskName) -> BoxFuture<'_, Result<()>> {
        let run = self.graph.run(&task);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = match run.await {
                Ok(()) => TaskOutcome::Success,
                Err(err) => {
                    error!(task = %task, error = %err, "triggered run failed");
                    TaskOutcome::Failed
                }
            };
            if tx
                .send(WatchEvent::TaskCompleted { task, outcome })
                .await
                .is_err()
            {
                warn!("watch runtime gone; dropping completion event");
            }
        });

        Box::pin(async { Ok(()) })
    }
}
