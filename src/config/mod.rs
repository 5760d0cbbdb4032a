// src/config/mod.rs

//! Configuration loading and validation for assetdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and resolve the dependency list
//!   (`loader.rs`).
//! - Validate references and global settings (`validate.rs`). Cycles are
//!   left to the task graph builder.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_dependencies};
pub use model::{ConfigFile, ConfigSection, NotifySection, RawConfigFile, TaskConfig, TransformConfig};
