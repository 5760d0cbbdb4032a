// src/transform/mod.rs

//! Pluggable processing steps applied by pipelines.
//!
//! The pipeline never inspects which transform it holds: it hands the current
//! asset list to [`Transform::apply`] and takes back whatever comes out.
//! Built-in transforms:
//!
//! - [`command::CommandTransform`] pipes each asset through an external tool
//!   (style compiler, bundler, minifier, image optimiser, ...).
//! - [`concat::ConcatTransform`] aggregates all assets into one file.
//! - [`rename::RenameTransform`] rewrites output paths with a regex.

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;

use crate::config::model::TransformConfig;
use crate::pipeline::Asset;
use crate::types::BoxFuture;

pub mod command;
pub mod concat;
pub mod rename;

pub use command::CommandTransform;
pub use concat::ConcatTransform;
pub use rename::RenameTransform;

/// A named unit of work consuming and producing assets.
///
/// Implementations may fail; the pipeline wraps the error with its own name
/// and the transform's name and stops processing.
pub trait Transform: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn apply(&self, assets: Vec<Asset>) -> BoxFuture<'_, Result<Vec<Asset>>>;

    /// Whether the output depends on every input at once. A pipeline holding
    /// such a transform feeds it the full input set whenever anything changed.
    fn aggregates(&self) -> bool {
        false
    }
}

/// Instantiate a transform from its config table.
pub fn build_transform(cfg: &TransformConfig) -> Result<Arc<dyn Transform>> {
    let transform: Arc<dyn Transform> = match cfg {
        TransformConfig::Command { cmd, extension } => {
            Arc::new(CommandTransform::new(cmd.clone(), extension.clone()))
        }
        TransformConfig::Concat { file } => Arc::new(ConcatTransform::new(file.clone())),
        TransformConfig::Rename { pattern, replace } => {
            Arc::new(RenameTransform::new(pattern, replace.clone())?)
        }
    };
    Ok(transform)
}
