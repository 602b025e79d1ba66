//! File-backed store: one pretty-printed JSON file per key.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, TankError};

use super::{KvStore, SubscriberCallback, SubscriberRegistry, Subscription};

/// A [`KvStore`] persisting each key as `<dir>/<key>.json`.
///
/// Writes go through a temp file and an atomic rename, so a crash
/// mid-write leaves the previous value intact. A file that fails to
/// parse reads as absent, with a warning logged, so one corrupt key
/// never takes down the session.
pub struct JsonFileStore {
    dir: PathBuf,
    registry: SubscriberRegistry,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| {
            TankError::Storage(format!(
                "failed to create data directory {}: {err}",
                dir.display()
            ))
        })?;
        Ok(Self {
            dir,
            registry: SubscriberRegistry::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Move the freshly written temp file over `destination`.
///
/// `fs::rename` refuses to clobber an existing destination on some
/// platforms (notably Windows), so on failure the destination is removed
/// and the rename retried once. A rename that still fails cleans up the
/// temp file so no `.json.tmp` litter accumulates in the data directory.
fn replace_file(temp_path: &Path, destination: &Path) -> std::io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            std::io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic replace failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

/// Map a store key to a filename-safe stem. Keys like `viewPrefs:assets`
/// contain a colon, which is not portable in filenames.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl KvStore for JsonFileStore {
    fn read_value(&self, key: &str) -> Option<Value> {
        let path = self.key_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(key, path = %path.display(), error = %err, "failed to read stored value");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, path = %path.display(), error = %err, "stored value is not valid JSON");
                None
            }
        }
    }

    fn write_value(&self, key: &str, value: Value) -> Result<()> {
        let path = self.key_path(key);
        let temp = path.with_extension("json.tmp");
        let rendered = serde_json::to_string_pretty(&value)?;
        fs::write(&temp, rendered).map_err(|err| {
            TankError::Storage(format!("failed to write {}: {err}", temp.display()))
        })?;
        replace_file(&temp, &path).map_err(|err| {
            TankError::Storage(format!("failed to replace {}: {err}", path.display()))
        })?;
        self.registry.notify(key, &value);
        Ok(())
    }

    fn subscribe(&self, key: &str, callback: SubscriberCallback) -> Subscription {
        self.registry.add(key, callback)
    }
}
