//! Notification display and sound playback collaborators.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::records::AppSettings;
use crate::storage::{NotificationsConfig, SharedStore, StoreExt, StoreKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Displays a user-visible banner.
pub trait Notifier: Send + Sync {
    fn show(&self, notification: &Notification) -> Result<(), CoreError>;
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn show(&self, notification: &Notification) -> Result<(), CoreError> {
        (**self).show(notification)
    }
}

/// Plays a named notification sound.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, sound: &str);
}

/// Notifier that writes banners to the log.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    enabled: bool,
    app_name: String,
}

impl LogNotifier {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self {
            enabled: config.enabled,
            app_name: config.app_name.clone(),
        }
    }
}

impl Notifier for LogNotifier {
    fn show(&self, notification: &Notification) -> Result<(), CoreError> {
        if self.enabled {
            tracing::info!(
                app = %self.app_name,
                title = %notification.title,
                message = %notification.message,
                "notification"
            );
        }
        Ok(())
    }
}

/// Drops banners while `appSettings.notificationsEnabled` is off.
///
/// The setting is read on every call so a change made by another process
/// takes effect without a restart. An unreadable setting counts as on.
pub struct SettingsGate<N> {
    store: SharedStore,
    inner: N,
}

impl<N: Notifier> SettingsGate<N> {
    pub fn new(store: SharedStore, inner: N) -> Self {
        Self { store, inner }
    }

    fn enabled(&self) -> bool {
        match self.store.load_or_default::<AppSettings>(StoreKey::AppSettings) {
            Ok(settings) => settings.notifications_enabled,
            Err(e) => {
                tracing::warn!(error = %e, "could not read app settings");
                true
            }
        }
    }
}

impl<N: Notifier> Notifier for SettingsGate<N> {
    fn show(&self, notification: &Notification) -> Result<(), CoreError> {
        if !self.enabled() {
            tracing::debug!(title = %notification.title, "notifications disabled, dropping");
            return Ok(());
        }
        self.inner.show(notification)
    }
}

/// Sound player that only records the request in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSoundPlayer;

impl SoundPlayer for LogSoundPlayer {
    fn play(&self, sound: &str) {
        tracing::debug!(sound, "playing notification sound");
    }
}

/// Keeps every notification it is asked to show.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
    sounds: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn sounds(&self) -> Vec<String> {
        self.sounds.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, notification: &Notification) -> Result<(), CoreError> {
        self.shown
            .lock()
            .map_err(|_| CoreError::Notify("recorder poisoned".into()))?
            .push(notification.clone());
        Ok(())
    }
}

impl SoundPlayer for RecordingNotifier {
    fn play(&self, sound: &str) {
        if let Ok(mut sounds) = self.sounds.lock() {
            sounds.push(sound.to_string());
        }
    }
}

/// Show a notification, logging instead of failing.
pub(crate) fn show_soft(notifier: &dyn Notifier, notification: Notification) {
    if let Err(e) = notifier.show(&notification) {
        tracing::warn!(error = %e, title = %notification.title, "failed to show notification");
    }
}
