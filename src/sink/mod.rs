// src/sink/mod.rs

//! Notification sinks: who hears about finished pipelines.
//!
//! The core only calls the two trait methods. Delivery is fire-and-forget;
//! a sink must never block or fail the pipeline that notifies it.

use std::fmt::Debug;
use std::path::PathBuf;

use tracing::info;

pub mod command;

pub use command::CommandSink;

pub trait NotificationSink: Send + Sync + Debug {
    /// A pipeline wrote these destination paths.
    fn notify(&self, changed: &[PathBuf]);

    /// A watch-triggered task finished successfully.
    fn reload(&self);
}

/// Default sink: log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, changed: &[PathBuf]) {
        info!(files = changed.len(), "destination updated");
    }

    fn reload(&self) {
        info!("reload requested");
    }
}
