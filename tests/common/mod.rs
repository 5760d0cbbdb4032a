#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use assetdag::fs::mock::MockFileSystem;
use assetdag::pipeline::{ChangeTracker, Pipeline, SourceSet};

pub use assetdag_test_utils::fixtures::{ManualClock, RecordingSink, ScriptedTransform};
pub use assetdag_test_utils::init_tracing;

/// Fixed origin for mock modification times.
pub fn t0() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

/// `t0() + secs`.
pub fn at(secs: u64) -> SystemTime {
    t0() + Duration::from_secs(secs)
}

pub fn globs(base: &str, include: &[&str]) -> SourceSet {
    SourceSet::Globs {
        base: base.into(),
        include: include.iter().map(|s| s.to_string()).collect(),
        exclude: Vec::new(),
    }
}

/// Everything a pipeline test needs, backed by an in-memory filesystem.
pub struct Fixture {
    pub fs: Arc<MockFileSystem>,
    pub tracker: Arc<ChangeTracker>,
    pub clock: Arc<ManualClock>,
    pub sink: Arc<RecordingSink>,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        Self {
            fs: Arc::new(MockFileSystem::new()),
            tracker: Arc::new(ChangeTracker::new()),
            clock: ManualClock::new(t0()),
            sink: RecordingSink::new(),
        }
    }

    pub fn pipeline(&self, name: &str, sources: SourceSet, dest: impl AsRef<Path>) -> Pipeline {
        Pipeline::new(
            name,
            sources,
            dest.as_ref(),
            self.fs.clone(),
            self.tracker.clone(),
        )
        .with_clock(self.clock.clone())
        .with_sink(self.sink.clone())
    }

    pub fn contents(&self, path: &str) -> String {
        use assetdag::fs::FileSystem;
        String::from_utf8(self.fs.read(Path::new(path)).unwrap()).unwrap()
    }
}
