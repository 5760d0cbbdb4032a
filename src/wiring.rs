// src/wiring.rs

//! Turns a validated [`ConfigFile`] into a [`TaskGraph`].
//!
//! All relative paths resolve against the project root (the directory of
//! the config file). `{port}` in command tasks and notification commands is
//! replaced by `[config].port`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::loader::resolve_dependencies;
use crate::config::model::{
    ConfigFile, NotifySection, PipelineTaskConfig, TaskConfig, WatchRuleConfig,
};
use crate::dag::{TaskGraph, TaskGraphBuilder};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{ChangeTracker, Clock, Pipeline, SourceSet, SystemClock};
use crate::sink::{CommandSink, LogSink, NotificationSink};
use crate::tasks::{CleanTask, ShellTask, WatchRuleSpec, WatchTask};
use crate::transform::build_transform;
use crate::types::CompositionMode;
use crate::watch::path_utils::join_pattern;

/// Shared collaborators handed to every task built from the config.
#[derive(Debug, Clone)]
pub struct Wiring {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    tracker: Arc<ChangeTracker>,
    clock: Arc<dyn Clock>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl Wiring {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fs: Arc::new(RealFileSystem),
            tracker: Arc::new(ChangeTracker::new()),
            clock: Arc::new(SystemClock),
            sink: None,
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<ChangeTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use this sink instead of the one described by `[notify]`.
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tracker(&self) -> &Arc<ChangeTracker> {
        &self.tracker
    }

    /// Register every configured task and validate the resulting graph.
    pub fn build(&self, cfg: &ConfigFile) -> Result<TaskGraph> {
        let settings = cfg.config();
        let sink = match &self.sink {
            Some(sink) => Arc::clone(sink),
            None => sink_from_config(cfg.notify(), settings.port),
        };
        let dependencies = resolve_dependencies(settings, &self.root)?;
        let ctx = Context {
            wiring: self,
            cfg,
            sink,
            dependencies,
            source_root: self.root.join(&settings.source_root),
            dest_root: self.root.join(&settings.dest_root),
        };

        let mut builder = TaskGraphBuilder::new();
        for (name, task) in cfg.tasks() {
            ctx.register(&mut builder, name, task)?;
        }

        let graph = builder.build()?;
        info!(tasks = cfg.tasks().len(), root = ?self.root, "task graph ready");
        Ok(graph)
    }
}

/// Notification sink described by `[notify]`; log-only when empty.
pub fn sink_from_config(notify: &NotifySection, port: u16) -> Arc<dyn NotificationSink> {
    if notify.is_empty() {
        return Arc::new(LogSink);
    }
    let substitute = |cmd: &Option<String>| cmd.as_ref().map(|c| with_port(c, port));
    Arc::new(CommandSink::new(
        substitute(&notify.on_change),
        substitute(&notify.on_reload),
    ))
}

fn with_port(cmd: &str, port: u16) -> String {
    cmd.replace("{port}", &port.to_string())
}

/// Join `rel` onto `base`, treating `""` and `"."` as `base` itself.
fn join_rel(base: &Path, rel: &str) -> PathBuf {
    if rel.is_empty() || rel == "." {
        base.to_path_buf()
    } else {
        base.join(rel)
    }
}

struct Context<'a> {
    wiring: &'a Wiring,
    cfg: &'a ConfigFile,
    sink: Arc<dyn NotificationSink>,
    dependencies: Vec<String>,
    source_root: PathBuf,
    dest_root: PathBuf,
}

impl Context<'_> {
    fn register(&self, builder: &mut TaskGraphBuilder, name: &str, task: &TaskConfig) -> Result<()> {
        debug!(task = %name, kind = task.kind(), "wiring task");
        let fs = Arc::clone(&self.wiring.fs);

        match task {
            TaskConfig::Pipeline(pipeline) => {
                builder.register(name, Arc::new(self.pipeline(name, pipeline)?))?;
            }
            TaskConfig::Vendor(vendor) => {
                let sources = SourceSet::Vendor {
                    root: self.wiring.root.join(&self.cfg.config().vendor_root),
                    dependencies: self.dependencies.clone(),
                };
                let pipeline = self.base_pipeline(name, sources, &vendor.dest);
                builder.register(name, Arc::new(pipeline))?;
            }
            TaskConfig::Clean(clean) => {
                let path = match &clean.path {
                    Some(path) => self.wiring.root.join(path),
                    None => self.dest_root.clone(),
                };
                builder.register(name, Arc::new(CleanTask::new(path, fs)))?;
            }
            TaskConfig::Command(command) => {
                let cmd = with_port(&command.cmd, self.cfg.config().port);
                builder.register(name, Arc::new(ShellTask::new(name, cmd)))?;
            }
            TaskConfig::Series(group) => {
                builder.compose(name, CompositionMode::Series, &group.children)?;
            }
            TaskConfig::Parallel(group) => {
                builder.compose(name, CompositionMode::Parallel, &group.children)?;
            }
            TaskConfig::Watch(watch) => {
                let rules = watch
                    .rules
                    .iter()
                    .filter_map(|rule| self.watch_rule(name, rule))
                    .collect();
                let task = WatchTask::new(
                    rules,
                    self.wiring.root.clone(),
                    self.cfg.config().queue_length,
                    fs,
                    Arc::clone(&self.sink),
                );
                builder.register(name, Arc::new(task))?;
            }
        }
        Ok(())
    }

    fn base_pipeline(&self, name: &str, sources: SourceSet, dest: &str) -> Pipeline {
        Pipeline::new(
            name,
            sources,
            join_rel(&self.dest_root, dest),
            Arc::clone(&self.wiring.fs),
            Arc::clone(&self.wiring.tracker),
        )
        .with_clock(Arc::clone(&self.wiring.clock))
        .with_sink(Arc::clone(&self.sink))
    }

    fn pipeline(&self, name: &str, cfg: &PipelineTaskConfig) -> Result<Pipeline> {
        let sources = SourceSet::Globs {
            base: join_rel(&self.source_root, &cfg.base),
            include: cfg.src.clone(),
            exclude: cfg.exclude.clone(),
        };
        let mut pipeline = self
            .base_pipeline(name, sources, &cfg.dest)
            .with_sourcemaps(cfg.sourcemaps);
        for transform in &cfg.transforms {
            pipeline = pipeline.with_transform(build_transform(transform)?);
        }
        Ok(pipeline)
    }

    /// Resolve a rule's patterns relative to the project root. Returns `None`
    /// for a rule bound to a vendor task with nothing to copy.
    fn watch_rule(&self, watch: &str, rule: &WatchRuleConfig) -> Option<WatchRuleSpec> {
        let settings = self.cfg.config();
        let (include, mut exclude) = match (&rule.patterns, self.cfg.task(&rule.task)) {
            (Some(patterns), _) => (patterns.clone(), Vec::new()),
            (None, Some(TaskConfig::Pipeline(pipeline))) => {
                let source_root = settings.source_root.to_string_lossy();
                let prefix = |pattern: &String| {
                    join_pattern([source_root.as_ref(), pipeline.base.as_str(), pattern.as_str()])
                };
                (
                    pipeline.src.iter().map(&prefix).collect(),
                    pipeline.exclude.iter().map(&prefix).collect(),
                )
            }
            (None, Some(TaskConfig::Vendor(_))) => {
                if self.dependencies.is_empty() {
                    info!(task = %watch, target = %rule.task, "no dependencies to watch; rule skipped");
                    return None;
                }
                let vendor_root = settings.vendor_root.to_string_lossy();
                let include = self
                    .dependencies
                    .iter()
                    .map(|dep| join_pattern([vendor_root.as_ref(), dep.as_str(), "**/*"]))
                    .collect();
                (include, Vec::new())
            }
            (None, _) => (Vec::new(), Vec::new()),
        };
        exclude.extend(rule.exclude.iter().cloned());

        Some(WatchRuleSpec {
            task: rule.task.clone(),
            include,
            exclude,
            use_hash: rule.use_hash,
            debounce: Duration::from_millis(rule.debounce_ms.unwrap_or(settings.debounce_ms)),
        })
    }
}
