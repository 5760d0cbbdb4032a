// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] spawns shell commands, either as stdin/stdout filters (used
//!   by command transforms) or as logged long-running processes (command
//!   tasks such as the dev server).
//! - [`backend`] provides the `ExecutorBackend` trait and the `GraphExecutor`
//!   the watch runtime uses in production; tests replace it with a fake.

pub mod backend;
pub mod command;

pub use backend::{ExecutorBackend, GraphExecutor};
pub use command::{describe_status, run_filter, run_logged, shell_command};
