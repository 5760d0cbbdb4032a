// src/dag/mod.rs

//! Named tasks and their composition.
//!
//! - [`task`] defines the [`Task`] trait every leaf implements.
//! - [`builder`] collects registrations and composites and validates them
//!   (unique names, resolvable references, no cycles) before anything runs.
//! - [`graph`] is the frozen, executable [`TaskGraph`].

pub mod builder;
pub mod graph;
pub mod task;

pub use builder::TaskGraphBuilder;
pub use graph::{TaskGraph, TaskNode};
pub use task::Task;
