#![allow(dead_code)]

use std::collections::BTreeMap;

use assetdag::config::model::{
    CleanTaskConfig, CommandTaskConfig, GroupTaskConfig, NotifySection, PipelineTaskConfig,
    VendorTaskConfig, WatchRuleConfig, WatchTaskConfig,
};
use assetdag::config::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig, TransformConfig};
use assetdag::errors::Result;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                notify: NotifySection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.config.config.dependencies = Some(deps.iter().map(|d| d.to_string()).collect());
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.config.config.debounce_ms = ms;
        self
    }

    pub fn with_queue_length(mut self, len: usize) -> Self {
        self.config.config.queue_length = len;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.config.port = port;
        self
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for pipeline tasks.
pub struct PipelineBuilder {
    pipeline: PipelineTaskConfig,
}

impl PipelineBuilder {
    pub fn new(src: &[&str]) -> Self {
        Self {
            pipeline: PipelineTaskConfig {
                src: src.iter().map(|s| s.to_string()).collect(),
                base: ".".to_string(),
                exclude: Vec::new(),
                dest: String::new(),
                sourcemaps: false,
                transforms: Vec::new(),
            },
        }
    }

    pub fn base(mut self, base: &str) -> Self {
        self.pipeline.base = base.to_string();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.pipeline.exclude.push(pattern.to_string());
        self
    }

    pub fn dest(mut self, dest: &str) -> Self {
        self.pipeline.dest = dest.to_string();
        self
    }

    pub fn sourcemaps(mut self) -> Self {
        self.pipeline.sourcemaps = true;
        self
    }

    pub fn command(mut self, cmd: &str, extension: Option<&str>) -> Self {
        self.pipeline.transforms.push(TransformConfig::Command {
            cmd: cmd.to_string(),
            extension: extension.map(str::to_string),
        });
        self
    }

    pub fn concat(mut self, file: &str) -> Self {
        self.pipeline.transforms.push(TransformConfig::Concat { file: file.into() });
        self
    }

    pub fn rename(mut self, pattern: &str, replace: &str) -> Self {
        self.pipeline.transforms.push(TransformConfig::Rename {
            pattern: pattern.to_string(),
            replace: replace.to_string(),
        });
        self
    }

    pub fn build(self) -> TaskConfig {
        TaskConfig::Pipeline(self.pipeline)
    }
}

pub fn series(children: &[&str]) -> TaskConfig {
    TaskConfig::Series(group(children))
}

pub fn parallel(children: &[&str]) -> TaskConfig {
    TaskConfig::Parallel(group(children))
}

fn group(children: &[&str]) -> GroupTaskConfig {
    GroupTaskConfig {
        children: children.iter().map(|c| c.to_string()).collect(),
    }
}

pub fn command(cmd: &str) -> TaskConfig {
    TaskConfig::Command(CommandTaskConfig {
        cmd: cmd.to_string(),
    })
}

pub fn clean() -> TaskConfig {
    TaskConfig::Clean(CleanTaskConfig::default())
}

pub fn vendor() -> TaskConfig {
    TaskConfig::Vendor(VendorTaskConfig {
        dest: "node_modules".to_string(),
    })
}

pub fn watch(rules: Vec<WatchRuleConfig>) -> TaskConfig {
    TaskConfig::Watch(WatchTaskConfig { rules })
}

/// A rule that derives its patterns from the target task.
pub fn rule(task: &str) -> WatchRuleConfig {
    WatchRuleConfig {
        task: task.to_string(),
        patterns: None,
        exclude: Vec::new(),
        use_hash: false,
        debounce_ms: None,
    }
}

/// A rule with explicit patterns.
pub fn rule_with_patterns(task: &str, patterns: &[&str]) -> WatchRuleConfig {
    WatchRuleConfig {
        patterns: Some(patterns.iter().map(|p| p.to_string()).collect()),
        ..rule(task)
    }
}
