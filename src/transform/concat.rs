// src/transform/concat.rs

use std::path::PathBuf;

use anyhow::Result;

use crate::pipeline::{sourcemap, Asset};
use crate::transform::Transform;
use crate::types::BoxFuture;

/// Joins every asset into a single output file, newline separated.
///
/// Breaks the 1:1 source/destination mapping on purpose. No inputs means no
/// output.
#[derive(Debug, Clone)]
pub struct ConcatTransform {
    file: PathBuf,
}

impl ConcatTransform {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }
}

impl Transform for ConcatTransform {
    fn name(&self) -> &str {
        "concat"
    }

    fn aggregates(&self) -> bool {
        true
    }

    fn apply(&self, assets: Vec<Asset>) -> BoxFuture<'_, Result<Vec<Asset>>> {
        Box::pin(async move {
            if assets.is_empty() {
                return Ok(Vec::new());
            }

            let mut contents = Vec::new();
            let mut sources: Vec<PathBuf> = Vec::new();
            let tracks_map = assets.iter().any(|a| a.source_map.is_some());

            for asset in assets {
                if !contents.is_empty() && !contents.ends_with(b"\n") {
                    contents.push(b'\n');
                }
                contents.extend_from_slice(&asset.contents);
                for src in asset.sources {
                    if !sources.contains(&src) {
                        sources.push(src);
                    }
                }
            }

            let mut joined = Asset::new(self.file.clone(), contents);
            joined.sources = sources;
            if tracks_map {
                sourcemap::init(std::slice::from_mut(&mut joined));
            }
            Ok(vec![joined])
        })
    }
}
