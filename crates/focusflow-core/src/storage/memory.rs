use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, StoreKey};
use crate::error::StoreError;

/// In-process store used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, String>>,
    fail_reads: Mutex<bool>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail, to exercise fail-soft paths.
    pub fn fail_reads(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_reads.lock() {
            *flag = fail;
        }
    }

    /// Make every subsequent write or removal fail.
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    fn check_writable(&self, key: StoreKey) -> Result<(), StoreError> {
        if *self.fail_writes.lock().map_err(|_| StoreError::Poisoned)? {
            return Err(StoreError::QueryFailed(format!("write of {key} refused")));
        }
        Ok(())
    }

    pub fn contains(&self, key: StoreKey) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(&key))
            .unwrap_or(false)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        if *self.fail_reads.lock().map_err(|_| StoreError::Poisoned)? {
            return Err(StoreError::QueryFailed(format!("read of {key} refused")));
        }
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(&key).cloned())
    }

    fn set_raw(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        self.check_writable(key)?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.check_writable(key)?;
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(&key);
        Ok(())
    }
}
