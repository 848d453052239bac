//! The Shared Store.
//!
//! A flat namespace of named JSON records that every controller reads and
//! writes. There are no transactions: each write replaces the whole record
//! and the last writer wins.

mod config;
pub mod database;
mod memory;

pub use config::{
    Config, LoggingConfig, NotificationsConfig, StorageConfig, TimerConfig, MAX_FLUSH_EVERY_SECS,
};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConfigError, StoreError};

/// Keys of the Shared Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    UserData,
    Pomodoro,
    Goals,
    Analytics,
    Integrations,
    AppSettings,
    CurrentSession,
}

impl StoreKey {
    pub const ALL: [StoreKey; 7] = [
        StoreKey::UserData,
        StoreKey::Pomodoro,
        StoreKey::Goals,
        StoreKey::Analytics,
        StoreKey::Integrations,
        StoreKey::AppSettings,
        StoreKey::CurrentSession,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::UserData => "userData",
            StoreKey::Pomodoro => "pomodoro",
            StoreKey::Goals => "goals",
            StoreKey::Analytics => "analytics",
            StoreKey::Integrations => "integrations",
            StoreKey::AppSettings => "appSettings",
            StoreKey::CurrentSession => "currentSession",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw key-value access to the Shared Store.
pub trait KeyValueStore: Send + Sync {
    fn get_raw(&self, key: StoreKey) -> Result<Option<String>, StoreError>;
    fn set_raw(&self, key: StoreKey, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: StoreKey) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

/// Typed record access on top of [`KeyValueStore`].
pub trait StoreExt: KeyValueStore {
    /// Decode the record under `key`. Missing keys and JSON `null` are `None`.
    fn load<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| corrupt(key, e))?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| corrupt(key, e))
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, key: StoreKey) -> Result<T, StoreError> {
        Ok(self.load(key)?.unwrap_or_default())
    }

    fn save<T: Serialize>(&self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|e| corrupt(key, e))?;
        self.set_raw(key, &json)
    }
}

impl<S: KeyValueStore + ?Sized> StoreExt for S {}

fn corrupt(key: StoreKey, err: serde_json::Error) -> StoreError {
    StoreError::Corrupt {
        key: key.to_string(),
        message: err.to_string(),
    }
}

/// Returns `~/.config/focusflow[-dev]/` based on FOCUSFLOW_ENV.
///
/// Set FOCUSFLOW_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusflow-dev")
    } else {
        base_dir.join("focusflow")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
