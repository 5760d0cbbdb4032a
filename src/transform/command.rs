// src/transform/command.rs

use anyhow::{Context, Result};
use tracing::debug;

use crate::exec::command::run_filter;
use crate::pipeline::Asset;
use crate::transform::Transform;
use crate::types::BoxFuture;

/// Environment variable carrying the asset's relative path to the command.
pub const FILE_ENV: &str = "ASSETDAG_FILE";

/// Pipes every asset through a shell command: contents on stdin, new
/// contents from stdout.
///
/// This is how external tools are plugged in, e.g. `sass --stdin`,
/// `esbuild --bundle --minify` or an image optimiser reading stdin.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    name: String,
    cmd: String,
    extension: Option<String>,
}

impl CommandTransform {
    /// `extension`, if set, replaces the extension of every output path
    /// (`main.scss` -> `main.css`).
    pub fn new(cmd: impl Into<String>, extension: Option<String>) -> Self {
        let cmd = cmd.into();
        let name = cmd
            .split_whitespace()
            .next()
            .unwrap_or("command")
            .to_string();
        Self {
            name,
            cmd,
            extension,
        }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }
}

impl Transform for CommandTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, assets: Vec<Asset>) -> BoxFuture<'_, Result<Vec<Asset>>> {
        Box::pin(async move {
            let mut out = Vec::with_capacity(assets.len());
            for mut asset in assets {
                let rel = asset.path_str();
                debug!(cmd = %self.cmd, file = %rel, "running command transform");

                asset.contents = run_filter(&self.cmd, &asset.contents, &[(FILE_ENV, rel.as_str())])
                    .await
                    .with_context(|| format!("processing '{rel}'"))?;

                if let Some(ext) = &self.extension {
                    asset.path.set_extension(ext);
                }
                out.push(asset);
            }
            Ok(out)
        })
    }
}
