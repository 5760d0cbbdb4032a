// src/transform/rename.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use regex::Regex;

use crate::pipeline::Asset;
use crate::transform::Transform;
use crate::types::BoxFuture;

/// Rewrites output paths with a regex replacement, e.g. `\.js$` -> `.min.js`.
///
/// Paths are matched in their forward-slash form.
#[derive(Debug, Clone)]
pub struct RenameTransform {
    pattern: Regex,
    replace: String,
}

impl RenameTransform {
    pub fn new(pattern: &str, replace: impl Into<String>) -> Result<Self> {
        let pattern =
            Regex::new(pattern).with_context(|| format!("invalid rename pattern: {pattern}"))?;
        Ok(Self {
            pattern,
            replace: replace.into(),
        })
    }
}

impl Transform for RenameTransform {
    fn name(&self) -> &str {
        "rename"
    }

    fn apply(&self, assets: Vec<Asset>) -> BoxFuture<'_, Result<Vec<Asset>>> {
        Box::pin(async move {
            Ok(assets
                .into_iter()
                .map(|mut asset| {
                    let renamed = self
                        .pattern
                        .replace(&asset.path_str(), self.replace.as_str())
                        .into_owned();
                    asset.path = PathBuf::from(renamed);
                    asset
                })
                .collect())
        })
    }
}
