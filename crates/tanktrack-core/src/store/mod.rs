//! Durable key-value store adapter.
//!
//! The [`KvStore`] trait is the seam between the project repository and
//! whatever durable storage backs it, so the repository can be tested
//! against an in-memory fake. Values are JSON; typed access goes through
//! [`read_or`] and [`write_json`].
//!
//! Failure semantics:
//! - a corrupt or missing stored value reads as not-found; [`read_or`]
//!   logs and returns the caller's fallback, it never errors.
//! - a failed write is returned to the caller as a recoverable error;
//!   the caller keeps its in-memory value.
//!
//! Writes from the same handle are visible to the very next read
//! (read-your-writes). Subscribers are notified synchronously after the
//! backing write, with no registry lock held during callbacks, so a
//! callback may itself read, write, or subscribe.

mod json_file;
mod memory;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Store key holding the JSON array of projects.
pub const PROJECTS_KEY: &str = "projects";
/// Store key holding the active project id.
pub const ACTIVE_PROJECT_KEY: &str = "activeProjectId";
/// Store key holding the persisted working copy.
pub const WORKING_SNAPSHOT_KEY: &str = "workingSnapshot";
/// Prefix for per-table view preference keys.
pub const VIEW_PREFS_KEY_PREFIX: &str = "viewPrefs";

/// Callback invoked with the new value whenever a subscribed key changes.
pub type SubscriberCallback = Box<dyn Fn(&Value) + Send + Sync>;

/// Generic durable key-value storage with change notification.
pub trait KvStore: Send + Sync {
    /// Raw JSON for `key`, or `None` when absent or undecodable.
    fn read_value(&self, key: &str) -> Option<Value>;

    /// Persist `value` under `key` and notify subscribers of the key.
    ///
    /// # Errors
    ///
    /// Returns `TankError::Storage` if the backing write fails. The
    /// store's previous value for the key is unspecified after a failed
    /// write; callers keep their in-memory copy either way.
    fn write_value(&self, key: &str, value: Value) -> Result<()>;

    /// Register `callback` for changes to `key`. Dropping the returned
    /// [`Subscription`] unsubscribes.
    fn subscribe(&self, key: &str, callback: SubscriberCallback) -> Subscription;
}

/// Read and deserialize `key`, falling back on absence or corruption.
pub fn read_or<T: DeserializeOwned>(store: &dyn KvStore, key: &str, fallback: T) -> T {
    match store.read_value(key) {
        Some(value) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(key, error = %err, "stored value failed to decode; using fallback");
                fallback
            }
        },
        None => fallback,
    }
}

/// Serialize `value` and persist it under `key`.
pub fn write_json<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    store.write_value(key, serde_json::to_value(value)?)
}

type SharedCallback = Arc<dyn Fn(&Value) + Send + Sync>;
type SubscriberMap = HashMap<String, Vec<(u64, SharedCallback)>>;

/// Per-key subscriber bookkeeping shared by the store backends.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    subscribers: Arc<Mutex<SubscriberMap>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, key: &str, callback: SubscriberCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut map) = self.subscribers.lock() {
            map.entry(key.to_string())
                .or_default()
                .push((id, Arc::from(callback)));
        }
        Subscription {
            key: key.to_string(),
            id,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    /// Invoke every subscriber of `key` with `value`.
    ///
    /// The subscriber list is snapshotted first and the lock released, so
    /// callbacks are free to touch the store again.
    pub(crate) fn notify(&self, key: &str, value: &Value) {
        let callbacks: Vec<SharedCallback> = match self.subscribers.lock() {
            Ok(map) => map
                .get(key)
                .map(|entries| entries.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        for callback in callbacks {
            callback(value);
        }
    }
}

/// RAII handle for a key subscription; dropping it unsubscribes.
pub struct Subscription {
    key: String,
    id: u64,
    registry: Weak<Mutex<SubscriberMap>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut map) = registry.lock() {
                if let Some(entries) = map.get_mut(&self.key) {
                    entries.retain(|(id, _)| *id != self.id);
                }
            }
        }
    }
}
