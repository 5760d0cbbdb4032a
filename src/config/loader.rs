// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::config::model::{ConfigFile, ConfigSection, RawConfigFile};
use crate::errors::{AssetdagError, Result};

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` default functions).
/// - Checks task references, watch rules and global settings.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config location: `Assetdag.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Assetdag.toml")
}

/// The ordered dependency list used by vendor tasks.
///
/// An explicit `dependencies` list wins. Otherwise the keys of the
/// `"dependencies"` object in `dependencies_from` (resolved against `root`)
/// are used in declared order; a manifest without that object yields an
/// empty list.
pub fn resolve_dependencies(config: &ConfigSection, root: &Path) -> Result<Vec<String>> {
    if let Some(deps) = &config.dependencies {
        return Ok(deps.clone());
    }

    let Some(manifest) = &config.dependencies_from else {
        return Ok(Vec::new());
    };

    let path = root.join(manifest);
    let contents = fs::read_to_string(&path)?;
    let value: Value = serde_json::from_str(&contents)?;

    let deps = match value.get("dependencies") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        Some(_) => {
            return Err(AssetdagError::ConfigError(format!(
                "\"dependencies\" in {path:?} must be an object"
            )));
        }
    };

    debug!(manifest = ?path, count = deps.len(), "resolved dependency list");
    Ok(deps)
}
