// src/dag/builder.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::graph::{TaskGraph, TaskNode};
use crate::dag::task::Task;
use crate::errors::{AssetdagError, Result};
use crate::types::{CompositionMode, TaskName};

/// Registration phase of a [`TaskGraph`].
///
/// Duplicate names and self-containing composites are rejected on the spot;
/// unresolved references and cycles are rejected by [`TaskGraphBuilder::build`],
/// so every error surfaces before the first task runs.
#[derive(Debug, Default)]
pub struct TaskGraphBuilder {
    nodes: BTreeMap<TaskName, TaskNode>,
}

impl TaskGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a leaf task under a unique name.
    pub fn register(&mut self, name: impl Into<TaskName>, task: Arc<dyn Task>) -> Result<&mut Self> {
        let name = name.into();
        self.ensure_unique(&name)?;
        debug!(task = %name, "registered task");
        self.nodes.insert(name, TaskNode::Leaf(task));
        Ok(self)
    }

    /// Register a composite task running `children` in `mode`.
    pub fn compose<I, S>(
        &mut self,
        name: impl Into<TaskName>,
        mode: CompositionMode,
        children: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        let name = name.into();
        self.ensure_unique(&name)?;

        let children: Vec<TaskName> = children.into_iter().map(Into::into).collect();
        if children.iter().any(|c| *c == name) {
            return Err(AssetdagError::GraphComposition(format!(
                "composite '{name}' cannot contain itself"
            )));
        }

        debug!(task = %name, %mode, ?children, "registered composite");
        self.nodes.insert(name, TaskNode::Group { mode, children });
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Validate references and acyclicity, then freeze into a [`TaskGraph`].
    pub fn build(self) -> Result<TaskGraph> {
        self.validate_references()?;
        self.validate_acyclic()?;
        Ok(TaskGraph::new(self.nodes))
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.nodes.contains_key(name) {
            return Err(AssetdagError::GraphComposition(format!(
                "task '{name}' is already registered"
            )));
        }
        Ok(())
    }

    fn validate_references(&self) -> Result<()> {
        for (name, node) in &self.nodes {
            for target in node.references() {
                if !self.nodes.contains_key(&target) {
                    return Err(AssetdagError::GraphComposition(format!(
                        "task '{name}' references unknown task '{target}'"
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_acyclic(&self) -> Result<()> {
        // Edge direction: parent -> referenced task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        let references: Vec<(&str, Vec<TaskName>)> = self
            .nodes
            .iter()
            .map(|(name, node)| (name.as_str(), node.references()))
            .collect();

        for name in self.nodes.keys() {
            graph.add_node(name.as_str());
        }
        for (name, targets) in &references {
            for target in targets {
                graph.add_edge(*name, target.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(AssetdagError::GraphComposition(format!(
                "cycle detected in task graph involving task '{}'",
                cycle.node_id()
            ))),
        }
    }
}
