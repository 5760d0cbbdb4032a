// src/tasks/watch.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use crate::dag::{Task, TaskGraph};
use crate::engine::{CoreRuntime, RuleBinding, Runtime, WatchEvent};
use crate::errors::Result;
use crate::exec::GraphExecutor;
use crate::fs::FileSystem;
use crate::sink::NotificationSink;
use crate::types::{BoxFuture, TaskName};
use crate::watch::{RuleProfile, spawn_watcher};

/// A fully resolved watch rule: patterns relative to the project root, the
/// task they trigger and the debounce window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRuleSpec {
    pub task: TaskName,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub use_hash: bool,
    pub debounce: Duration,
}

/// Observes the project root and re-runs bound tasks on change, until the
/// process shuts down.
pub struct WatchTask {
    rules: Vec<WatchRuleSpec>,
    root: PathBuf,
    queue_length: usize,
    fs: Arc<dyn FileSystem>,
    sink: Arc<dyn NotificationSink>,
}

impl fmt::Debug for WatchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchTask")
            .field("rules", &self.rules)
            .field("root", &self.root)
            .field("queue_length", &self.queue_length)
            .finish_non_exhaustive()
    }
}

impl WatchTask {
    pub fn new(
        rules: Vec<WatchRuleSpec>,
        root: impl Into<PathBuf>,
        queue_length: usize,
        fs: Arc<dyn FileSystem>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            rules,
            root: root.into(),
            queue_length,
            fs,
            sink,
        }
    }

    pub fn rules(&self) -> &[WatchRuleSpec] {
        &self.rules
    }

    fn profiles(&self) -> Result<Vec<RuleProfile>> {
        self.rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                RuleProfile::new(index, rule.task.clone(), &rule.include, &rule.exclude, rule.use_hash)
            })
            .collect()
    }

    fn bindings(&self) -> Vec<RuleBinding> {
        self.rules
            .iter()
            .map(|rule| RuleBinding::new(rule.task.clone(), rule.debounce))
            .collect()
    }
}

impl Task for WatchTask {
    fn run<'a>(&'a self, graph: &'a Arc<TaskGraph>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let profiles = self.profiles()?;
            let (tx, rx) = mpsc::channel::<WatchEvent>(64);

            let _watcher = spawn_watcher(&self.root, profiles, tx.clone(), Arc::clone(&self.fs))?;
            info!(root = ?self.root, rules = self.rules.len(), "watching for changes");

            let executor = GraphExecutor::new(Arc::clone(graph), tx);
            let core = CoreRuntime::new(self.bindings(), self.queue_length);
            Runtime::new(core, rx, executor, Arc::clone(&self.sink))
                .run()
                .await
        })
    }

    fn references(&self) -> Vec<TaskName> {
        let mut targets: Vec<TaskName> = self.rules.iter().map(|r| r.task.clone()).collect();
        targets.sort();
        targets.dedup();
        targets
    }

    fn describe(&self) -> String {
        let rules: Vec<String> = self
            .rules
            .iter()
            .map(|r| format!("{:?} -> {}", r.include, r.task))
            .collect();
        format!("watch [{}]", rules.join(", "))
    }
}
