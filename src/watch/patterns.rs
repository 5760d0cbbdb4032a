// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::GlobSet;

use crate::errors;
use crate::fs::FileSystem;
use crate::pipeline::sources::build_globset;
use crate::types::TaskName;

/// Compiled include/exclude patterns for a single watch rule.
///
/// Patterns are relative to the project root. The watcher passes relative
/// paths (e.g. `"app/scss/main.scss"`) into [`RuleProfile::matches`].
#[derive(Clone)]
pub struct RuleProfile {
    index: usize,
    task: TaskName,
    include: GlobSet,
    exclude: Option<GlobSet>,
    use_hash: bool,
}

impl fmt::Debug for RuleProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleProfile")
            .field("index", &self.index)
            .field("task", &self.task)
            .field("use_hash", &self.use_hash)
            .finish_non_exhaustive()
    }
}

impl RuleProfile {
    pub fn new(
        index: usize,
        task: impl Into<TaskName>,
        include: &[String],
        exclude: &[String],
        use_hash: bool,
    ) -> errors::Result<Self> {
        let include = build_globset(include)?;
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude)?)
        };
        Ok(Self {
            index,
            task: task.into(),
            include,
            exclude,
            use_hash,
        })
    }

    /// Position of the rule in the watch task; the engine addresses rules by
    /// this index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn use_hash(&self) -> bool {
        self.use_hash
    }

    /// Key under which this rule's aggregate hash is stored.
    pub fn hash_key(&self) -> String {
        format!("{}#{}", self.task, self.index)
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(rel_path),
            None => true,
        }
    }
}

/// Collect all files under `root` that match this rule, sorted by path.
///
/// Used when computing aggregated hashes for `use_hash = true` rules.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    profile: &RuleProfile,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if profile.matches(&rel_str) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}
