// src/pipeline/change.rs

//! Incremental-build bookkeeping: which inputs are new since a pipeline's
//! last successful run.
//!
//! Records live in memory for the lifetime of the process. Losing them only
//! means the next invocation processes its full input set again, which is
//! safe because transforms are idempotent on their outputs.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;
use crate::pipeline::sources::SourceFile;
use crate::types::TaskName;

/// Source of "now" for pipeline invocations.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> SystemTime;
}

/// Wall-clock implementation used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Per-pipeline record of the last successful run.
///
/// Each pipeline only ever touches its own key, and the task graph never runs
/// a pipeline concurrently with itself, so a plain mutex is enough.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    records: Mutex<HashMap<TaskName, SystemTime>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskName, SystemTime>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start time of the last successful run of `pipeline`, if any.
    pub fn last_run(&self, pipeline: &str) -> Option<SystemTime> {
        self.lock().get(pipeline).copied()
    }

    /// Record a successful run. `started` must be the invocation start time,
    /// not the completion time, so files edited mid-run are picked up next
    /// time.
    pub fn record_success(&self, pipeline: &str, started: SystemTime) {
        debug!(pipeline = %pipeline, ?started, "recording successful run");
        self.lock().insert(pipeline.to_string(), started);
    }

    /// Keep only the files modified strictly after the last recorded run.
    ///
    /// Without a record this is the identity.
    pub fn filter_since(
        &self,
        pipeline: &str,
        files: Vec<SourceFile>,
        fs: &dyn FileSystem,
    ) -> Result<Vec<SourceFile>> {
        let Some(since) = self.last_run(pipeline) else {
            return Ok(files);
        };

        let total = files.len();
        let mut fresh = Vec::new();
        for file in files {
            if fs.modified(&file.abs)? > since {
                fresh.push(file);
            }
        }

        debug!(
            pipeline = %pipeline,
            total,
            fresh = fresh.len(),
            "filtered inputs against last successful run"
        );
        Ok(fresh)
    }
}
