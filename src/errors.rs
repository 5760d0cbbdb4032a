// src/errors.rs

//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid glob pattern '{pattern}': {reason}")]
    GlobExpansion { pattern: String, reason: String },

    #[error("transform '{transform}' failed in pipeline '{pipeline}': {source:#}")]
    Transform {
        pipeline: String,
        transform: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Task graph error: {0}")]
    GraphComposition(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("cannot watch {path:?}: {reason}")]
    WatchSetup { path: PathBuf, reason: String },

    #[error("task '{task}' failed: {reason}")]
    TaskFailed { task: String, reason: String },

    #[error("{} task(s) failed in parallel group '{group}': {}", .failures.len(), summarize(.failures))]
    ParallelFailed {
        group: String,
        failures: Vec<AssetdagError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn summarize(failures: &[AssetdagError]) -> String {
    failures
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl AssetdagError {
    /// Iterate over this error and, for parallel groups, every nested failure.
    ///
    /// Handy for callers that want to know whether a particular task failed
    /// somewhere inside a composite run.
    pub fn flatten(&self) -> Vec<&AssetdagError> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(err) = stack.pop() {
            match err {
                AssetdagError::ParallelFailed { failures, .. } => {
                    stack.extend(failures.iter().rev());
                }
                other => out.push(other),
            }
        }
        out
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetdagError>;
