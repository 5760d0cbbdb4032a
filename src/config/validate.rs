// src/config/validate.rs

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile, TaskConfig, TransformConfig};
use crate::errors::{AssetdagError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AssetdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.notify, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    for (name, task) in &cfg.task {
        validate_task(cfg, name, task)?;
    }
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(config_error(
            "config must contain at least one [task.<name>] section",
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.queue_length == 0 {
        return Err(config_error("[config].queue_length must be >= 1 (got 0)"));
    }
    if cfg.config.debounce_ms == 0 {
        return Err(config_error("[config].debounce_ms must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_task(cfg: &RawConfigFile, name: &str, task: &TaskConfig) -> Result<()> {
    match task {
        TaskConfig::Pipeline(pipeline) => {
            if pipeline.src.is_empty() {
                return Err(config_error(format!(
                    "pipeline '{name}' must list at least one `src` pattern"
                )));
            }
            for transform in &pipeline.transforms {
                if let TransformConfig::Rename { pattern, .. } = transform {
                    Regex::new(pattern).map_err(|e| {
                        config_error(format!(
                            "pipeline '{name}' has an invalid rename pattern '{pattern}': {e}"
                        ))
                    })?;
                }
            }
        }
        TaskConfig::Series(group) | TaskConfig::Parallel(group) => {
            if group.children.is_empty() {
                return Err(config_error(format!(
                    "{} task '{name}' must list at least one child",
                    task.kind()
                )));
            }
            for child in &group.children {
                ensure_task_exists(cfg, name, child)?;
            }
        }
        TaskConfig::Command(command) => {
            if command.cmd.trim().is_empty() {
                return Err(config_error(format!("command task '{name}' has an empty `cmd`")));
            }
        }
        TaskConfig::Watch(watch) => {
            if watch.rules.is_empty() {
                return Err(config_error(format!(
                    "watch task '{name}' must define at least one rule"
                )));
            }
            for rule in &watch.rules {
                ensure_task_exists(cfg, name, &rule.task)?;
                if rule.debounce_ms == Some(0) {
                    return Err(config_error(format!(
                        "watch task '{name}': rule for '{}' has debounce_ms = 0",
                        rule.task
                    )));
                }
                let target = cfg.task.get(&rule.task).filter(|t| !t.has_sources());
                if let (None, Some(target)) = (&rule.patterns, target) {
                    return Err(config_error(format!(
                        "watch task '{name}': rule for '{}' needs `patterns` ('{}' is a {} task)",
                        rule.task,
                        rule.task,
                        target.kind()
                    )));
                }
            }
        }
        TaskConfig::Vendor(_) | TaskConfig::Clean(_) => {}
    }
    Ok(())
}

fn ensure_task_exists(cfg: &RawConfigFile, owner: &str, target: &str) -> Result<()> {
    if !cfg.task.contains_key(target) {
        return Err(config_error(format!(
            "task '{owner}' references unknown task '{target}'"
        )));
    }
    Ok(())
}

fn config_error(msg: impl Into<String>) -> AssetdagError {
    AssetdagError::ConfigError(msg.into())
}
