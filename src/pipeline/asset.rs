// src/pipeline/asset.rs

use std::path::{Path, PathBuf};

use crate::pipeline::sourcemap::SourceMap;
use crate::pipeline::sources::SourceFile;

/// An in-flight file moving through a pipeline's transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Output path relative to the pipeline's destination root.
    pub path: PathBuf,
    pub contents: Vec<u8>,
    /// Original source files (relative to the source base) this asset was
    /// produced from. Aggregating transforms merge these.
    pub sources: Vec<PathBuf>,
    /// Present while source maps are being tracked for this pipeline.
    pub source_map: Option<SourceMap>,
}

impl Asset {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        Self {
            sources: vec![path.clone()],
            path,
            contents: contents.into(),
            source_map: None,
        }
    }

    pub fn from_source(file: &SourceFile, contents: Vec<u8>) -> Self {
        Self::new(file.rel.clone(), contents)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relative path with forward slashes, as used in source maps and logs.
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}
