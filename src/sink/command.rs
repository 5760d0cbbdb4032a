// src/sink/command.rs

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::exec::command::{describe_status, shell_command};
use crate::sink::NotificationSink;

/// Environment variable carrying the changed paths, one per line.
pub const CHANGED_ENV: &str = "ASSETDAG_CHANGED";

/// Runs shell commands in the background on notifications, e.g. a live-reload
/// server's CLI (`browser-sync reload --port 3000`).
///
/// Needs a Tokio runtime; commands are spawned and never awaited by the
/// caller.
#[derive(Debug, Clone, Default)]
pub struct CommandSink {
    on_change: Option<String>,
    on_reload: Option<String>,
}

impl CommandSink {
    pub fn new(on_change: Option<String>, on_reload: Option<String>) -> Self {
        Self {
            on_change,
            on_reload,
        }
    }

    fn spawn(&self, cmd: String, changed: Option<String>) {
        tokio::spawn(async move {
            let mut command = shell_command(&cmd);
            if let Some(changed) = changed {
                command.env(CHANGED_ENV, changed);
            }
            match command.status().await {
                Ok(status) if status.success() => {
                    debug!(cmd = %cmd, "notification command finished");
                }
                Ok(status) => {
                    warn!(
                        cmd = %cmd,
                        status = %describe_status(status),
                        "notification command failed"
                    );
                }
                Err(err) => {
                    warn!(cmd = %cmd, error = %err, "failed to spawn notification command");
                }
            }
        });
    }
}

impl NotificationSink for CommandSink {
    fn notify(&self, changed: &[PathBuf]) {
        if let Some(cmd) = &self.on_change {
            let joined = changed
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("\n");
            self.spawn(cmd.clone(), Some(joined));
        }
    }

    fn reload(&self) {
        if let Some(cmd) = &self.on_reload {
            self.spawn(cmd.clone(), None);
        }
    }
}
