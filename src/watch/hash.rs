// src/watch/hash.rs

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::fs::FileSystem;

/// Compute the blake3 hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut reader = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {path:?}"))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Compute a deterministic hash over the given files.
///
/// Paths are sorted first, and each file's path is mixed in with its
/// content, so renames and deletions change the aggregate too.
pub fn compute_aggregate_hash<P: AsRef<Path>>(fs: &dyn FileSystem, paths: &[P]) -> Result<String> {
    let mut sorted: Vec<&Path> = paths.iter().map(|p| p.as_ref()).collect();
    sorted.sort();

    let mut hasher = Hasher::new();
    for path in sorted {
        let file_hash = compute_file_hash(fs, path)?;
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update(file_hash.as_bytes());
    }

    let hash = hasher.finalize().to_hex().to_string();
    debug!(hash = %hash, "computed aggregate hash");
    Ok(hash)
}

/// Storage for the last aggregate hash of each rule.
pub trait HashStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, hash: &str);
}

/// Keeps hashes in memory for the lifetime of the watch task.
#[derive(Debug, Default)]
pub struct MemoryHashStore {
    map: HashMap<String, String>,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashStore for MemoryHashStore {
    fn load(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn save(&mut self, key: &str, hash: &str) {
        debug!(rule = %key, hash = %hash, "stored rule hash");
        self.map.insert(key.to_string(), hash.to_string());
    }
}
