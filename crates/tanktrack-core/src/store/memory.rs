//! In-memory store backend for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{Result, TankError};

use super::{KvStore, SubscriberCallback, SubscriberRegistry, Subscription};

/// A [`KvStore`] backed by a hash map.
///
/// Two repositories sharing one `Arc<MemoryStore>` see each other's
/// writes through subscriptions, which models two tabs over the same
/// browser storage. Writes can be made to fail on demand to exercise
/// quota-exhaustion paths.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    registry: SubscriberRegistry,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail until called with `false`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KvStore for MemoryStore {
    fn read_value(&self, key: &str) -> Option<Value> {
        match self.values.lock() {
            Ok(values) => values.get(key).cloned(),
            Err(_) => None,
        }
    }

    fn write_value(&self, key: &str, value: Value) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TankError::Storage(format!(
                "write of key '{key}' rejected: store is full"
            )));
        }
        {
            let mut values = self
                .values
                .lock()
                .map_err(|_| TankError::Storage("store lock poisoned".to_string()))?;
            values.insert(key.to_string(), value.clone());
        }
        self.registry.notify(key, &value);
        Ok(())
    }

    fn subscribe(&self, key: &str, callback: SubscriberCallback) -> Subscription {
        self.registry.add(key, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_your_writes() {
        let store = MemoryStore::new();
        store.write_value("k", Value::from("v")).unwrap();
        assert_eq!(store.read_value("k"), Some(Value::from("v")));
    }

    #[test]
    fn test_failed_write_leaves_previous_value() {
        let store = MemoryStore::new();
        store.write_value("k", Value::from(1)).unwrap();
        store.set_fail_writes(true);
        assert!(store.write_value("k", Value::from(2)).is_err());
        assert_eq!(store.read_value("k"), Some(Value::from(1)));
    }

    #[test]
    fn test_failed_write_does_not_notify() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::Arc;

        let store = MemoryStore::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_by_callback = Arc::clone(&seen);
        let _subscription = store.subscribe(
            "k",
            Box::new(move |_| {
                seen_by_callback.fetch_add(1, Ordering::SeqCst);
            }),
        );

        store.set_fail_writes(true);
        let _ = store.write_value("k", Value::from(1));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
