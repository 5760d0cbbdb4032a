// src/types.rs

//! Small shared types used across the graph, pipeline and watch layers.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Boxed, sendable future. Used at the trait seams (`Task`, `Transform`,
/// `ExecutorBackend`) so the traits stay object safe without `async-trait`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How the children of a composite task are executed.
///
/// - `Series`: strictly in listed order, stopping at the first failure.
/// - `Parallel`: all children start together; every child settles before the
///   composite reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionMode {
    Series,
    Parallel,
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionMode::Series => write!(f, "series"),
            CompositionMode::Parallel => write!(f, "parallel"),
        }
    }
}

/// Outcome of a single task invocation as seen by the watch engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}
