// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::WatchEvent;
use crate::errors::{AssetdagError, Result};
use crate::fs::FileSystem;
use crate::watch::event_handler::{SharedHashStore, prime_hashes, process_file_change};
use crate::watch::hash::{HashStore, MemoryHashStore};
use crate::watch::patterns::RuleProfile;

/// Keeps the underlying `RecommendedWatcher` alive. Dropping the handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Observe `root` recursively and send `WatchEvent::PathChanged` for every
/// rule whose patterns match a changed path.
///
/// - `root` is the project root against which all rule patterns are
///   evaluated.
/// - `profiles` are the compiled rules, indexed as the engine expects.
/// - `tx` is the channel into the watch engine.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<RuleProfile>,
    tx: mpsc::Sender<WatchEvent>,
    fs: Arc<dyn FileSystem>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().map_err(|err| AssetdagError::WatchSetup {
        path: root.clone(),
        reason: err.to_string(),
    })?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    // notify calls this synchronously from its own thread.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event_tx.send(event).is_err() {
                    debug!("watch loop finished; dropping notify event");
                }
            }
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )
    .map_err(|err| AssetdagError::WatchSetup {
        path: root.clone(),
        reason: err.to_string(),
    })?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .map_err(|err| AssetdagError::WatchSetup {
            path: root.clone(),
            reason: err.to_string(),
        })?;

    info!(?root, rules = profiles.len(), "file watcher started");

    let profiles = Arc::new(profiles);
    let hash_store: SharedHashStore =
        Arc::new(Mutex::new(Box::new(MemoryHashStore::new()) as Box<dyn HashStore>));

    tokio::spawn(async move {
        prime_hashes(
            Arc::clone(&fs),
            root.clone(),
            Arc::clone(&profiles),
            Arc::clone(&hash_store),
        )
        .await;

        while let Some(event) = event_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            debug!(?event, "received notify event");

            for path in &event.paths {
                let keep_going = process_file_change(
                    Arc::clone(&fs),
                    &root,
                    path,
                    &profiles,
                    &tx,
                    Arc::clone(&hash_store),
                )
                .await;
                if !keep_going {
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
