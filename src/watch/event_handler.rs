// src/watch/event_handler.rs

//! Event processing logic for filesystem changes.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::WatchEvent;
use crate::fs::FileSystem;
use crate::watch::hash::{HashStore, compute_aggregate_hash};
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{RuleProfile, collect_matching_files};

pub type SharedHashStore = Arc<Mutex<Box<dyn HashStore>>>;

/// Process a single changed path and forward it to every matching rule.
///
/// Returns `false` once the engine's channel is closed, so the caller can
/// stop its loop.
pub async fn process_file_change(
    fs: Arc<dyn FileSystem>,
    root: &Path,
    path: &Path,
    profiles: &Arc<Vec<RuleProfile>>,
    tx: &mpsc::Sender<WatchEvent>,
    hash_store: SharedHashStore,
) -> bool {
    let Some(rel_str) = relative_str(root, path) else {
        warn!(?path, ?root, "could not relativize event path against root");
        return true;
    };

    for profile in profiles.iter().filter(|p| p.matches(&rel_str)) {
        if !should_trigger_rule(Arc::clone(&fs), root, &rel_str, profile, Arc::clone(&hash_store)).await
        {
            continue;
        }

        debug!(rule = profile.index(), task = %profile.task(), path = %rel_str, "watch match");
        let event = WatchEvent::PathChanged {
            rule: profile.index(),
            path: rel_str.clone(),
        };
        if tx.send(event).await.is_err() {
            warn!("watch engine is gone; stopping event forwarding");
            return false;
        }
    }

    true
}

/// Store the current aggregate hash of every `use_hash` rule, so the first
/// event after startup is compared against the state the build started from.
pub async fn prime_hashes(
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    profiles: Arc<Vec<RuleProfile>>,
    hash_store: SharedHashStore,
) {
    let primed = tokio::task::spawn_blocking(move || {
        for profile in profiles.iter().filter(|p| p.use_hash()) {
            match current_hash(fs.as_ref(), &root, profile) {
                Ok(hash) => lock(&hash_store).save(&profile.hash_key(), &hash),
                Err(err) => warn!(
                    task = %profile.task(),
                    error = %err,
                    "failed to compute initial hash"
                ),
            }
        }
    })
    .await;

    if primed.is_err() {
        warn!("initial hashing panicked; first changes will always trigger");
    }
}

/// Decide whether a matching change should reach the engine.
///
/// Rules without `use_hash` always trigger. Hashed rules trigger only when
/// the aggregate hash of their files differs from the stored one; any
/// hashing failure errs on the side of triggering.
async fn should_trigger_rule(
    fs: Arc<dyn FileSystem>,
    root: &Path,
    rel_path: &str,
    profile: &RuleProfile,
    hash_store: SharedHashStore,
) -> bool {
    if !profile.use_hash() {
        return true;
    }

    let root = root.to_path_buf();
    let profile = profile.clone();
    let rel_path = rel_path.to_string();

    tokio::task::spawn_blocking(move || {
        let new_hash = match current_hash(fs.as_ref(), &root, &profile) {
            Ok(hash) => hash,
            Err(err) => {
                warn!(
                    task = %profile.task(),
                    error = %err,
                    "failed to hash watched files; triggering anyway"
                );
                return true;
            }
        };

        let key = profile.hash_key();
        let mut store = lock(&hash_store);
        if store.load(&key).as_deref() == Some(new_hash.as_str()) {
            info!(
                task = %profile.task(),
                path = %rel_path,
                "watched content unchanged; skipping trigger"
            );
            return false;
        }
        store.save(&key, &new_hash);
        true
    })
    .await
    .unwrap_or(true)
}

fn current_hash(fs: &dyn FileSystem, root: &Path, profile: &RuleProfile) -> anyhow::Result<String> {
    let files = collect_matching_files(fs, root, profile)?;
    compute_aggregate_hash(fs, &files)
}

fn lock(store: &SharedHashStore) -> std::sync::MutexGuard<'_, Box<dyn HashStore>> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}
