//! First-run defaults for the Shared Store.

use crate::analytics::AnalyticsRecord;
use crate::error::StoreError;
use crate::goals::GoalList;
use crate::records::{AppSettings, Integrations, UserData};
use crate::storage::{KeyValueStore, StoreExt, StoreKey};
use crate::timer::PomodoroRecord;

/// Write the default record for every key that is missing.
///
/// Returns the keys that were written. Existing records are left alone,
/// and `currentSession` has no default.
pub fn install_defaults<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<StoreKey>, StoreError> {
    let mut written = Vec::new();
    for key in StoreKey::ALL {
        if store.get_raw(key)?.is_some() {
            continue;
        }
        match key {
            StoreKey::UserData => store.save(key, &UserData::default())?,
            StoreKey::Pomodoro => store.save(key, &PomodoroRecord::default())?,
            StoreKey::Goals => store.save(key, &GoalList::seed())?,
            StoreKey::Analytics => store.save(key, &AnalyticsRecord::default())?,
            StoreKey::Integrations => store.save(key, &Integrations::default())?,
            StoreKey::AppSettings => store.save(key, &AppSettings::default())?,
            StoreKey::CurrentSession => continue,
        }
        written.push(key);
    }
    if !written.is_empty() {
        tracing::info!(keys = ?written, "installed default records");
    }
    Ok(written)
}
