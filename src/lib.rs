// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod sink;
pub mod tasks;
pub mod transform;
pub mod types;
pub mod watch;
pub mod wiring;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::dag::TaskGraph;
use crate::errors::{AssetdagError, Result};
use crate::wiring::Wiring;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - task graph construction
/// - running the requested task
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;
    let root = project_root(&args.config);

    let graph = Wiring::new(root.clone()).build(&cfg)?;
    if !graph.contains(&args.task) {
        return Err(AssetdagError::TaskNotFound(args.task));
    }

    if args.dry_run {
        print_dry_run(&graph, &args.task);
        return Ok(());
    }

    // External tools (transforms, the dev server) run relative to the
    // project root.
    std::env::set_current_dir(&root)?;
    info!(task = %args.task, root = ?root, "running");

    let graph = Arc::new(graph);
    tokio::select! {
        result = graph.run(&args.task) => result,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupted; shutting down");
            Ok(())
        }
    }
}

/// Directory of the config file, or the current directory for a bare file
/// name.
fn project_root(config_path: &Path) -> PathBuf {
    let root = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    root.canonicalize().unwrap_or(root)
}

/// Print every task and its structure without running anything.
fn print_dry_run(graph: &TaskGraph, entry: &str) {
    println!("assetdag dry-run (entry: {entry})");
    println!();
    for line in graph.describe() {
        println!("  {line}");
    }
    debug!("dry-run complete (no execution)");
}
