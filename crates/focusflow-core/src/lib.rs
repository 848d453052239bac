//! # FocusFlow Core Library
//!
//! Core logic for the FocusFlow Pomodoro timer. Everything the CLI does goes
//! through this crate, and every piece of state lives in one Shared Store of
//! named JSON records.
//!
//! ## Architecture
//!
//! - **Timer**: a pure [`TimerEngine`] state machine, driven once per second
//!   by a [`TimerController`] that flushes it to the store and turns
//!   completions into notifications and analytics
//! - **Session**: a long-lived [`SessionController`] serving a closed
//!   message protocol, tracking `currentSession` and the daily rollover
//! - **Storage**: SQLite key-value records and TOML process configuration
//!
//! ## Key Components
//!
//! - [`TimerController`]: attach/detach lifecycle around the timer
//! - [`SessionController`]: session bookkeeping and message handling
//! - [`Database`]: the on-disk Shared Store
//! - [`Config`]: application configuration management

pub mod account;
pub mod analytics;
pub mod error;
pub mod events;
pub mod goals;
pub mod install;
pub mod notify;
pub mod records;
pub mod scheduled;
pub mod session;
pub mod storage;
pub mod timer;

pub use account::{Account, CoworkingRoom, Plan};
pub use analytics::{AnalyticsRecord, AnalyticsUpdater};
pub use error::{ConfigError, CoreError, ProtocolError, StoreError, ValidationError};
pub use events::Event;
pub use goals::{GoalList, GoalRecord};
pub use install::install_defaults;
pub use notify::{LogNotifier, LogSoundPlayer, Notification, Notifier, SettingsGate, SoundPlayer};
pub use records::{AppSettings, Integrations, Theme, UserData};
pub use session::{Request, Response, SessionClient, SessionController, SessionData, SessionRecord};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, SharedStore, StoreExt, StoreKey};
pub use timer::{AttachOptions, PomodoroRecord, TimerController, TimerEngine, TimerMode, TimerServices, TimerState};
