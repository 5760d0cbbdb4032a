// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::dag::task::Task;
use crate::errors::{AssetdagError, Result};
use crate::types::{BoxFuture, CompositionMode, TaskName};

/// A registered node: either a leaf task or a composite of other names.
#[derive(Clone)]
pub enum TaskNode {
    Leaf(Arc<dyn Task>),
    Group {
        mode: CompositionMode,
        children: Vec<TaskName>,
    },
}

impl fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskNode::Leaf(task) => f.debug_tuple("Leaf").field(task).finish(),
            TaskNode::Group { mode, children } => f
                .debug_struct("Group")
                .field("mode", mode)
                .field("children", children)
                .finish(),
        }
    }
}

impl TaskNode {
    /// Names this node depends on: composite children, or whatever a leaf
    /// triggers at run time.
    pub fn references(&self) -> Vec<TaskName> {
        match self {
            TaskNode::Leaf(task) => task.references(),
            TaskNode::Group { children, .. } => children.clone(),
        }
    }
}

/// Validated, executable task graph. Built by
/// [`TaskGraphBuilder`](crate::dag::TaskGraphBuilder).
///
/// Every leaf has its own async mutex: a leaf never overlaps its own previous
/// invocation, and concurrent callers queue behind it in FIFO order.
/// Unrelated tasks run concurrently.
pub struct TaskGraph {
    nodes: BTreeMap<TaskName, TaskNode>,
    locks: HashMap<TaskName, Arc<Mutex<()>>>,
}

impl fmt::Debug for TaskGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGraph")
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}

impl TaskGraph {
    pub(crate) fn new(nodes: BTreeMap<TaskName, TaskNode>) -> Self {
        let locks = nodes
            .iter()
            .filter(|(_, node)| matches!(node, TaskNode::Leaf(_)))
            .map(|(name, _)| (name.clone(), Arc::new(Mutex::new(()))))
            .collect();
        Self { nodes, locks }
    }

    /// All task names, sorted.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&TaskNode> {
        self.nodes.get(name)
    }

    /// Human readable listing used by `--dry-run`.
    pub fn describe(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|(name, node)| match node {
                TaskNode::Leaf(task) => format!("{name}: {}", task.describe()),
                TaskNode::Group { mode, children } => {
                    format!("{name}: {mode}({})", children.join(", "))
                }
            })
            .collect()
    }

    /// Run the named task (leaf or composite).
    ///
    /// The returned future owns a handle to the graph, so it can be spawned.
    pub fn run(self: &Arc<Self>, name: &str) -> BoxFuture<'static, Result<()>> {
        let graph = Arc::clone(self);
        let name = name.to_string();
        Box::pin(async move { graph.run_node(name).await })
    }

    async fn run_node(self: Arc<Self>, name: TaskName) -> Result<()> {
        let node = self
            .nodes
            .get(&name)
            .cloned()
            .ok_or_else(|| AssetdagError::TaskNotFound(name.clone()))?;

        match node {
            TaskNode::Leaf(task) => self.run_leaf(&name, task).await,
            TaskNode::Group {
                mode: CompositionMode::Series,
                children,
            } => self.run_series(&name, &children).await,
            TaskNode::Group {
                mode: CompositionMode::Parallel,
                children,
            } => self.run_parallel(&name, &children).await,
        }
    }

    async fn run_leaf(self: &Arc<Self>, name: &str, task: Arc<dyn Task>) -> Result<()> {
        let lock = self
            .locks
            .get(name)
            .cloned()
            .ok_or_else(|| AssetdagError::TaskNotFound(name.to_string()))?;

        if lock.try_lock().is_err() {
            debug!(task = %name, "task already running; waiting for it to finish");
        }
        let _guard = lock.lock().await;

        info!(task = %name, "starting task");
        let started = Instant::now();
        let result = task.run(self).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => info!(task = %name, elapsed_ms, "finished task"),
            Err(err) => error!(task = %name, elapsed_ms, error = %err, "task failed"),
        }
        result
    }

    /// Children strictly in order; the first failure stops the series.
    async fn run_series(self: &Arc<Self>, name: &str, children: &[TaskName]) -> Result<()> {
        debug!(task = %name, ?children, "running series");
        for child in children {
            self.run(child).await?;
        }
        Ok(())
    }

    /// All children at once; every child settles before failures are
    /// reported, in declaration order.
    async fn run_parallel(self: &Arc<Self>, name: &str, children: &[TaskName]) -> Result<()> {
        debug!(task = %name, ?children, "running parallel group");

        let mut set = JoinSet::new();
        for (idx, child) in children.iter().enumerate() {
            let fut = self.run(child);
            set.spawn(async move { (idx, fut.await) });
        }

        let mut failures: Vec<(usize, AssetdagError)> = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((idx, Err(err))) => failures.push((idx, err)),
                Err(join_err) => failures.push((
                    usize::MAX,
                    AssetdagError::Other(anyhow::anyhow!("task panicked: {join_err}")),
                )),
            }
        }

        if failures.is_empty() {
            return Ok(());
        }

        failures.sort_by_key(|(idx, _)| *idx);
        Err(AssetdagError::ParallelFailed {
            group: name.to_string(),
            failures: failures.into_iter().map(|(_, err)| err).collect(),
        })
    }
}
