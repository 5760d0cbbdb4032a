// src/tasks/clean.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::dag::{Task, TaskGraph};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::BoxFuture;

/// Removes a directory tree (normally the destination root). A missing
/// directory counts as already clean.
#[derive(Debug)]
pub struct CleanTask {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl CleanTask {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }
}

impl Task for CleanTask {
    fn run<'a>(&'a self, _graph: &'a Arc<TaskGraph>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.fs
                .remove_dir_all(&self.path)
                .with_context(|| format!("cleaning {:?}", self.path))?;
            info!(path = ?self.path, "cleaned");
            Ok(())
        })
    }

    fn describe(&self) -> String {
        format!("clean {:?}", self.path)
    }
}
