// src/tasks/shell.rs

use std::sync::Arc;

use crate::dag::{Task, TaskGraph};
use crate::errors::{AssetdagError, Result};
use crate::exec::{describe_status, run_logged};
use crate::types::{BoxFuture, TaskName};

/// Runs a shell command, e.g. the static dev server. A non-zero exit fails
/// the task.
#[derive(Debug)]
pub struct ShellTask {
    name: TaskName,
    cmd: String,
}

impl ShellTask {
    pub fn new(name: impl Into<TaskName>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
        }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }
}

impl Task for ShellTask {
    fn run<'a>(&'a self, _graph: &'a Arc<TaskGraph>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let status = run_logged(&self.name, &self.cmd, &[]).await?;
            if status.success() {
                Ok(())
            } else {
                Err(AssetdagError::TaskFailed {
                    task: self.name.clone(),
                    reason: format!("`{}` exited with {}", self.cmd, describe_status(status)),
                })
            }
        })
    }

    fn describe(&self) -> String {
        format!("command `{}`", self.cmd)
    }
}
