// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from `Assetdag.toml`.
///
/// ```toml
/// [config]
/// source_root = "app"
/// dest_root = "dist"
/// debounce_ms = 200
///
/// [task.html]
/// kind = "pipeline"
/// src = ["**/*.html"]
///
/// [task.build]
/// kind = "series"
/// children = ["html"]
/// ```
///
/// This is pure deserialization; convert it into a [`ConfigFile`] with
/// `ConfigFile::try_from` to validate it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub notify: NotifySection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// A validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    notify: NotifySection,
    task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    /// Assemble a config without validation; used by `TryFrom<RawConfigFile>`.
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        notify: NotifySection,
        task: BTreeMap<String, TaskConfig>,
    ) -> Self {
        Self {
            config,
            notify,
            task,
        }
    }

    pub fn config(&self) -> &ConfigSection {
        &self.config
    }

    pub fn notify(&self) -> &NotifySection {
        &self.notify
    }

    pub fn tasks(&self) -> &BTreeMap<String, TaskConfig> {
        &self.task
    }

    pub fn task(&self, name: &str) -> Option<&TaskConfig> {
        self.task.get(name)
    }
}

/// `[config]` section. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Root of the source tree, relative to the project root.
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Root of the destination tree, relative to the project root.
    #[serde(default = "default_dest_root")]
    pub dest_root: PathBuf,

    /// Where vendor dependencies are read from.
    #[serde(default = "default_vendor_root")]
    pub vendor_root: PathBuf,

    /// Port of the dev server, substituted for `{port}` in commands.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Debounce window for watch rules that do not set their own.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of pending re-runs remembered per task while it is
    /// running.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Packages copied by vendor tasks, in order.
    #[serde(default)]
    pub dependencies: Option<Vec<String>>,

    /// `package.json` whose `dependencies` keys are used when
    /// `dependencies` is not given.
    #[serde(default)]
    pub dependencies_from: Option<PathBuf>,
}

fn default_source_root() -> PathBuf {
    PathBuf::from("app")
}

fn default_dest_root() -> PathBuf {
    PathBuf::from("dist")
}

fn default_vendor_root() -> PathBuf {
    PathBuf::from("node_modules")
}

fn default_port() -> u16 {
    3000
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_queue_length() -> usize {
    1
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            dest_root: default_dest_root(),
            vendor_root: default_vendor_root(),
            port: default_port(),
            debounce_ms: default_debounce_ms(),
            queue_length: default_queue_length(),
            dependencies: None,
            dependencies_from: None,
        }
    }
}

/// `[notify]` section: shell commands run by the notification sink. When
/// both are absent, notifications are only logged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifySection {
    /// Run after a pipeline wrote files; `ASSETDAG_CHANGED` holds the paths.
    #[serde(default)]
    pub on_change: Option<String>,

    /// Run after a watch-triggered task succeeded.
    #[serde(default)]
    pub on_reload: Option<String>,
}

impl NotifySection {
    pub fn is_empty(&self) -> bool {
        self.on_change.is_none() && self.on_reload.is_none()
    }
}

/// `[task.<name>]` section, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskConfig {
    Pipeline(PipelineTaskConfig),
    Vendor(VendorTaskConfig),
    Clean(CleanTaskConfig),
    Command(CommandTaskConfig),
    Series(GroupTaskConfig),
    Parallel(GroupTaskConfig),
    Watch(WatchTaskConfig),
}

impl TaskConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            TaskConfig::Pipeline(_) => "pipeline",
            TaskConfig::Vendor(_) => "vendor",
            TaskConfig::Clean(_) => "clean",
            TaskConfig::Command(_) => "command",
            TaskConfig::Series(_) => "series",
            TaskConfig::Parallel(_) => "parallel",
            TaskConfig::Watch(_) => "watch",
        }
    }

    /// Whether a watch rule can derive its patterns from this task.
    pub fn has_sources(&self) -> bool {
        matches!(self, TaskConfig::Pipeline(_) | TaskConfig::Vendor(_))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineTaskConfig {
    /// Globs relative to `source_root/base`.
    pub src: Vec<String>,

    /// Directory under `source_root` that output paths are relative to.
    #[serde(default = "default_base")]
    pub base: String,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Output directory relative to `dest_root`.
    #[serde(default)]
    pub dest: String,

    #[serde(default)]
    pub sourcemaps: bool,

    /// Applied in order.
    #[serde(default)]
    pub transforms: Vec<TransformConfig>,
}

fn default_base() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct VendorTaskConfig {
    /// Output directory relative to `dest_root`.
    #[serde(default = "default_vendor_dest")]
    pub dest: String,
}

fn default_vendor_dest() -> String {
    "node_modules".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleanTaskConfig {
    /// Directory to remove, relative to the project root. Defaults to
    /// `dest_root`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandTaskConfig {
    pub cmd: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupTaskConfig {
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchTaskConfig {
    pub rules: Vec<WatchRuleConfig>,
}

/// One entry of a watch task's `rules`.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchRuleConfig {
    /// Task triggered on change.
    pub task: String,

    /// Globs relative to the project root. When absent, derived from the
    /// target pipeline's source set.
    #[serde(default)]
    pub patterns: Option<Vec<String>>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Only trigger when the content of the matched files changed.
    #[serde(default)]
    pub use_hash: bool,

    /// Overrides `[config].debounce_ms` for this rule.
    #[serde(default)]
    pub debounce_ms: Option<u64>,
}

/// A transform table inside a pipeline's `transforms` list, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransformConfig {
    /// Pipe each asset through a shell command.
    Command {
        cmd: String,
        #[serde(default)]
        extension: Option<String>,
    },
    /// Join all assets into `file`.
    Concat { file: PathBuf },
    /// Rewrite output paths matching `pattern`.
    Rename { pattern: String, replace: String },
}
