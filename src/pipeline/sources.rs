// src/pipeline/sources.rs

//! Source sets: which files a pipeline reads, and the base they are relative
//! to.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::errors::{AssetdagError, Result};
use crate::fs::FileSystem;

/// A concrete input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as seen by the filesystem.
    pub abs: PathBuf,
    /// Path relative to the source set's base, with forward slashes. This is
    /// the path the file keeps under the destination root.
    pub rel: PathBuf,
}

/// Declares the inputs of a pipeline.
#[derive(Debug, Clone)]
pub enum SourceSet {
    /// Files under `base` matching any `include` glob and no `exclude` glob.
    Globs {
        base: PathBuf,
        include: Vec<String>,
        exclude: Vec<String>,
    },
    /// Every file of every listed package under `root`. Relative paths keep
    /// the package directory, e.g. `jquery/dist/jquery.js`.
    Vendor {
        root: PathBuf,
        dependencies: Vec<String>,
    },
}

/// Result of expanding a source set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    Files(Vec<SourceFile>),
    /// A vendor set with an empty dependency list.
    NoDependencies,
}

impl SourceSet {
    /// Base directory that relative paths are computed against.
    pub fn base(&self) -> &Path {
        match self {
            SourceSet::Globs { base, .. } => base,
            SourceSet::Vendor { root, .. } => root,
        }
    }

    /// Glob patterns (relative to [`SourceSet::base`]) selecting the inputs.
    pub fn include_patterns(&self) -> Vec<String> {
        match self {
            SourceSet::Globs { include, .. } => include.clone(),
            SourceSet::Vendor { dependencies, .. } => dependencies
                .iter()
                .map(|dep| format!("{dep}/**/*"))
                .collect(),
        }
    }

    pub fn exclude_patterns(&self) -> &[String] {
        match self {
            SourceSet::Globs { exclude, .. } => exclude,
            SourceSet::Vendor { .. } => &[],
        }
    }

    /// Expand into a sorted list of concrete files.
    ///
    /// A missing base directory yields no files rather than an error.
    pub fn expand(&self, fs: &dyn FileSystem) -> Result<Expansion> {
        if let SourceSet::Vendor { dependencies, .. } = self {
            if dependencies.is_empty() {
                return Ok(Expansion::NoDependencies);
            }
        }

        let include = build_globset(&self.include_patterns())?;
        let exclude = build_globset(self.exclude_patterns())?;
        let base = self.base();

        if !fs.is_dir(base) {
            debug!(?base, "source base does not exist; no inputs");
            return Ok(Expansion::Files(Vec::new()));
        }

        let mut files = Vec::new();
        let mut stack = vec![base.to_path_buf()];

        while let Some(dir) = stack.pop() {
            for path in fs.read_dir(&dir)? {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    let Some(rel) = relative_to(base, &path) else {
                        continue;
                    };
                    if include.is_match(&rel) && !exclude.is_match(&rel) {
                        files.push(SourceFile {
                            abs: path,
                            rel: PathBuf::from(rel),
                        });
                    }
                }
            }
        }

        files.sort_by(|a, b| a.rel.cmp(&b.rel));
        Ok(Expansion::Files(files))
    }
}

/// Relative path with forward slashes, ignoring `.` components on either side.
fn relative_to(base: &Path, path: &Path) -> Option<String> {
    let base: PathBuf = base
        .components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect();
    let path: PathBuf = path
        .components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect();
    let rel = path.strip_prefix(&base).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Build a GlobSet from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|e| AssetdagError::GlobExpansion {
            pattern: pat.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| AssetdagError::GlobExpansion {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}
