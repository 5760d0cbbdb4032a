// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::sink::NotificationSink;

use super::core::CoreRuntime;
use super::{CoreCommand, WatchEvent};

/// Async IO shell around [`CoreRuntime`].
///
/// Reads `WatchEvent`s from the channel, wakes up when the earliest debounce
/// deadline passes, dispatches runs through an `ExecutorBackend` and
/// forwards reloads to the notification sink. All decisions are made by the
/// core.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<WatchEvent>,
    executor: E,
    sink: Arc<dyn NotificationSink>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<WatchEvent>,
        executor: E,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            core,
            event_rx,
            executor,
            sink,
        }
    }

    /// Main event loop. Returns when shutdown is requested or every sender
    /// of the event channel is gone.
    pub async fn run(mut self) -> Result<()> {
        info!(rules = self.core.rules().len(), "watch runtime started");

        loop {
            let deadline = self.core.next_deadline();

            let event = tokio::select! {
                received = self.event_rx.recv() => match received {
                    Some(event) => event,
                    None => {
                        info!("watch event channel closed; exiting");
                        break;
                    }
                },
                _ = wait_for(deadline) => WatchEvent::DebounceElapsed,
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event, Instant::now().into_std());

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("shutdown requested; stopping watch runtime");
                break;
            }
        }

        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::Dispatch(task) => {
                debug!(task = %task, "dispatching task");
                self.executor.spawn_task(task).await
            }
            CoreCommand::Reload(task) => {
                debug!(task = %task, "requesting reload");
                self.sink.reload();
                Ok(())
            }
        }
    }
}

async fn wait_for(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
