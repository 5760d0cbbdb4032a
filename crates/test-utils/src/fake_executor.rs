use std::sync::{Arc, Mutex};

use assetdag::engine::WatchEvent;
use assetdag::errors::Result;
use assetdag::exec::ExecutorBackend;
use assetdag::types::{BoxFuture, TaskName, TaskOutcome};
use tokio::sync::mpsc;

/// A fake executor that records which tasks were dispatched.
///
/// - `auto_complete(outcome)`: immediately reports `TaskCompleted` with the
///   given outcome for each dispatched task.
/// - `manual()`: reports nothing; the test sends `TaskCompleted` itself, which
///   makes "still in flight" states easy to hold open.
pub struct FakeExecutor {
    tx: mpsc::Sender<WatchEvent>,
    auto: Option<TaskOutcome>,
    dispatched: Arc<Mutex<Vec<TaskName>>>,
}

impl FakeExecutor {
    pub fn auto_complete(tx: mpsc::Sender<WatchEvent>, outcome: TaskOutcome) -> Self {
        Self {
            tx,
            auto: Some(outcome),
            dispatched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn manual(tx: mpsc::Sender<WatchEvent>) -> Self {
        Self {
            tx,
            auto: None,
            dispatched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of the dispatch log, usable after the executor moved into
    /// the runtime.
    pub fn dispatched(&self) -> Arc<Mutex<Vec<TaskName>>> {
        Arc::clone(&self.dispatched)
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_task(&mut self, task: TaskName) -> BoxFuture<'_, Result<()>> {
        let tx = self.tx.clone();
        let auto = self.auto;
        let dispatched = Arc::clone(&self.dispatched);

        Box::pin(async move {
            dispatched.lock().unwrap().push(task.clone());
            if let Some(outcome) = auto {
                tx.send(WatchEvent::TaskCompleted { task, outcome })
                    .await
                    .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
