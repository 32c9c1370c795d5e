//! Transient Key/Value Storage
//!
//! Short-lived store used for the checkout-to-platform round trip: the
//! installment schedule and the payment-method-change marker both live
//! here. TTLs are supplied by the caller; there is no ambient global state.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde_json::Value;

/// TTL key/value store
pub trait TransientStore: Send + Sync {
    /// Store `value` under `key`; it disappears after `ttl`
    fn set(&self, key: &str, value: Value, ttl: Duration);

    fn get(&self, key: &str) -> Option<Value>;

    fn delete(&self, key: &str);
}

/// In-memory transient store (for development and tests)
#[derive(Default)]
pub struct MemoryTransientStore {
    entries: RwLock<HashMap<String, (Value, Instant)>>,
}

impl MemoryTransientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransientStore for MemoryTransientStore {
    fn set(&self, key: &str, value: Value, ttl: Duration) {
        let deadline = Instant::now() + ttl;
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), (value, deadline));
    }

    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.write().unwrap();
        match entries.get(key) {
            Some((_, deadline)) if *deadline <= Instant::now() => {
                entries.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }

    fn delete(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }
}
