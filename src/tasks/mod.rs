// src/tasks/mod.rs

//! Built-in leaf tasks besides pipelines.

pub mod clean;
pub mod shell;
pub mod watch;

pub use clean::CleanTask;
pub use shell::ShellTask;
pub use watch::{WatchRuleSpec, WatchTask};
