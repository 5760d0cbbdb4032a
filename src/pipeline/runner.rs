// src/pipeline/runner.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::dag::{Task, TaskGraph};
use crate::errors::{AssetdagError, Result};
use crate::fs::FileSystem;
use crate::pipeline::asset::Asset;
use crate::pipeline::change::{ChangeTracker, Clock, SystemClock};
use crate::pipeline::sourcemap;
use crate::pipeline::sources::{Expansion, SourceSet};
use crate::sink::NotificationSink;
use crate::transform::Transform;
use crate::types::{BoxFuture, TaskName};

/// Diagnostic reported by a vendor pipeline with nothing to copy.
pub const NO_DEPENDENCIES: &str = "No dependencies specified";

/// What a single pipeline invocation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Files matched by the source set.
    pub matched: usize,
    /// Files that were new since the last successful run and got processed.
    pub processed: usize,
    /// Destination paths written.
    pub written: Vec<PathBuf>,
    /// Set when the run succeeded without doing anything for a reason worth
    /// telling the user about.
    pub diagnostic: Option<String>,
}

/// An ordered list of transforms applied to a filtered file set.
pub struct Pipeline {
    name: TaskName,
    sources: SourceSet,
    dest_root: PathBuf,
    transforms: Vec<Arc<dyn Transform>>,
    sourcemaps: bool,
    fs: Arc<dyn FileSystem>,
    tracker: Arc<ChangeTracker>,
    clock: Arc<dyn Clock>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("sources", &self.sources)
            .field("dest_root", &self.dest_root)
            .field("transforms", &self.transforms)
            .field("sourcemaps", &self.sourcemaps)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        name: impl Into<TaskName>,
        sources: SourceSet,
        dest_root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        tracker: Arc<ChangeTracker>,
    ) -> Self {
        Self {
            name: name.into(),
            sources,
            dest_root: dest_root.into(),
            transforms: Vec::new(),
            sourcemaps: false,
            fs,
            tracker,
            clock: Arc::new(SystemClock),
            sink: None,
        }
    }

    pub fn with_transform(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn with_sourcemaps(mut self, enabled: bool) -> Self {
        self.sourcemaps = enabled;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    pub fn dest_root(&self) -> &PathBuf {
        &self.dest_root
    }

    /// Run the pipeline once.
    ///
    /// Steps: expand sources, drop inputs older than the last successful run,
    /// apply transforms in order (wrapped by source maps when enabled), write
    /// outputs under the destination root, then record success and notify.
    /// Any failure leaves the change record untouched.
    ///
    /// A pipeline with an aggregating transform hands the whole matched set
    /// to its transforms as soon as one input is fresh, so a bundle is never
    /// rebuilt from the changed files alone.
    ///
    /// Filesystem work runs on the blocking pool.
    pub async fn run_pipeline(&self) -> Result<PipelineReport> {
        let started = self.clock.now();

        let (fs, sources) = (Arc::clone(&self.fs), self.sources.clone());
        let files = match blocking(move || sources.expand(fs.as_ref())).await? {
            Expansion::Files(files) => files,
            Expansion::NoDependencies => {
                info!(pipeline = %self.name, "{}", NO_DEPENDENCIES);
                return Ok(PipelineReport {
                    diagnostic: Some(NO_DEPENDENCIES.to_string()),
                    ..PipelineReport::default()
                });
            }
        };

        let matched = files.len();
        let aggregating = self.transforms.iter().any(|t| t.aggregates());
        let all = if aggregating { files.clone() } else { Vec::new() };

        let (fs, tracker, name) = (Arc::clone(&self.fs), Arc::clone(&self.tracker), self.name.clone());
        let fresh = blocking(move || Ok(tracker.filter_since(&name, files, fs.as_ref())?)).await?;

        if fresh.is_empty() {
            debug!(pipeline = %self.name, matched, "no new inputs; nothing to do");
            return Ok(PipelineReport {
                matched,
                ..PipelineReport::default()
            });
        }

        let inputs = if aggregating {
            debug!(pipeline = %self.name, fresh = fresh.len(), "aggregating pipeline; using every input");
            all
        } else {
            fresh
        };

        let processed = inputs.len();
        info!(pipeline = %self.name, matched, processed, "running pipeline");

        let fs = Arc::clone(&self.fs);
        let mut assets = blocking(move || {
            let mut assets = Vec::with_capacity(inputs.len());
            for file in &inputs {
                let contents = fs.read(&file.abs)?;
                assets.push(Asset::from_source(file, contents));
            }
            Ok(assets)
        })
        .await?;

        if self.sourcemaps {
            sourcemap::init(&mut assets);
        }

        for transform in &self.transforms {
            debug!(
                pipeline = %self.name,
                transform = transform.name(),
                assets = assets.len(),
                "applying transform"
            );
            assets = transform
                .apply(assets)
                .await
                .map_err(|source| AssetdagError::Transform {
                    pipeline: self.name.clone(),
                    transform: transform.name().to_string(),
                    source,
                })?;
        }

        if self.sourcemaps {
            assets = sourcemap::write(assets)?;
        }

        let (fs, dest_root) = (Arc::clone(&self.fs), self.dest_root.clone());
        let written = blocking(move || {
            let mut written = Vec::with_capacity(assets.len());
            for asset in &assets {
                let dest = dest_root.join(asset.path());
                fs.write(&dest, &asset.contents)?;
                written.push(dest);
            }
            Ok(written)
        })
        .await?;

        self.tracker.record_success(&self.name, started);

        info!(
            pipeline = %self.name,
            processed,
            written = written.len(),
            "pipeline finished"
        );

        if let Some(sink) = &self.sink {
            if !written.is_empty() {
                sink.notify(&written);
            }
        }

        Ok(PipelineReport {
            matched,
            processed,
            written,
            diagnostic: None,
        })
    }
}

/// Run filesystem work on tokio's blocking pool.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| AssetdagError::Other(anyhow::anyhow!("filesystem worker failed: {err}")))?
}

impl Task for Pipeline {
    fn run<'a>(&'a self, _graph: &'a Arc<TaskGraph>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.run_pipeline().await?;
            Ok(())
        })
    }

    fn describe(&self) -> String {
        let names: Vec<&str> = self.transforms.iter().map(|t| t.name()).collect();
        match &self.sources {
            SourceSet::Globs { base, include, .. } => format!(
                "pipeline {:?} {:?} -> {:?} via {:?}{}",
                base,
                include,
                self.dest_root,
                names,
                if self.sourcemaps { " (sourcemaps)" } else { "" }
            ),
            SourceSet::Vendor { root, dependencies } => format!(
                "vendor {:?} {:?} -> {:?}",
                root, dependencies, self.dest_root
            ),
        }
    }
}
