//! TTL file cache for network responses.
//!
//! Entries are JSON files named by the sha256 of their key, each holding
//! a unix timestamp and the cached string. Expired or unreadable entries
//! are removed and treated as misses; write failures are swallowed, a
//! cold cache is never worth failing an analysis over.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    timestamp: u64,
    value: String,
}

#[derive(Debug)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileCache {
    /// Opens (and creates if needed) the cache directory.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, ttl })
    }

    /// Returns the cached value for `key`, or `None` when missing,
    /// expired, or unreadable.
    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        let raw = fs::read_to_string(&path).ok()?;

        let entry: Entry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(_) => {
                Self::remove(&path);
                return None;
            }
        };

        if unix_now().saturating_sub(entry.timestamp) > self.ttl.as_secs() {
            debug!("cache entry for key expired, removing");
            Self::remove(&path);
            return None;
        }

        Some(entry.value)
    }

    /// Stores `value` under `key` with the current timestamp.
    pub fn set(&self, key: &str, value: &str) {
        let entry = Entry {
            timestamp: unix_now(),
            value: value.to_string(),
        };
        let Ok(json) = serde_json::to_string(&entry) else {
            return;
        };
        if let Err(error) = fs::write(self.path_for(key), json) {
            debug!("cache write failed: {error}");
        }
    }

    /// Removes every cache entry.
    pub fn clear(&self) -> io::Result<()> {
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                Self::remove(&path);
            }
        }
        Ok(())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }

    fn remove(path: &Path) {
        let _ = fs::remove_file(path);
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
