pub mod account;
pub mod config;
pub mod daemon;
pub mod goals;
pub mod send;
pub mod settings;
pub mod stats;
pub mod timer;

use std::sync::Arc;

use focusflow_core::{install_defaults, Config, Database, LogNotifier, SettingsGate, SharedStore};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the Shared Store, seeding defaults on first use.
pub fn open_store(config: &Config) -> Result<SharedStore, Box<dyn std::error::Error>> {
    let db = Database::open(config)?;
    install_defaults(&db)?;
    Ok(Arc::new(db))
}

/// Log-backed banners, muted by config or by `appSettings`.
pub fn notifier(config: &Config, store: &SharedStore) -> Arc<SettingsGate<LogNotifier>> {
    Arc::new(SettingsGate::new(
        store.clone(),
        LogNotifier::new(&config.notifications),
    ))
}
