// src/pipeline/mod.rs

//! Incremental asset pipelines.
//!
//! - [`change`] decides which inputs are new since the last successful run.
//! - [`sources`] expands a pipeline's source set into concrete files.
//! - [`asset`] is the in-flight file representation handed to transforms.
//! - [`sourcemap`] wraps the transform chain with source map tracking.
//! - [`runner`] holds [`Pipeline`] itself.

pub mod asset;
pub mod change;
pub mod runner;
pub mod sourcemap;
pub mod sources;

pub use asset::Asset;
pub use change::{ChangeTracker, Clock, SystemClock};
pub use runner::{Pipeline, PipelineReport};
pub use sources::{Expansion, SourceFile, SourceSet};
