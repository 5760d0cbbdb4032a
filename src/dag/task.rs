// src/dag/task.rs

use std::fmt::Debug;
use std::sync::Arc;

use crate::dag::graph::TaskGraph;
use crate::errors::Result;
use crate::types::{BoxFuture, TaskName};

/// A leaf unit of work in the task graph.
///
/// `run` receives the graph it is registered in so that tasks which drive
/// other tasks (the watch task) can trigger them by name.
pub trait Task: Send + Sync + Debug {
    fn run<'a>(&'a self, graph: &'a Arc<TaskGraph>) -> BoxFuture<'a, Result<()>>;

    /// Names of other tasks this task triggers at run time. They must resolve
    /// when the graph is built, and they count as edges for cycle detection.
    fn references(&self) -> Vec<TaskName> {
        Vec::new()
    }

    /// One-line description for `--dry-run` output.
    fn describe(&self) -> String;
}
