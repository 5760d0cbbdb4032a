// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling each watch rule's include / exclude glob patterns.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - (Optionally) content hashing, so a rule does not fire when its watched
//!   files have not actually changed.
//!
//! It does **not** know about the task graph; it only turns filesystem
//! changes into rule-level `WatchEvent::PathChanged` events for the engine.

pub mod event_handler;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use hash::{HashStore, MemoryHashStore};
pub use patterns::{RuleProfile, collect_matching_files};
pub use watcher::{WatcherHandle, spawn_watcher};
