use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerMode, TimerState};

/// Every state change of the timer produces an Event.
/// The UI controller turns them into side effects; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// One second elapsed without finishing the interval.
    Ticked {
        remaining_secs: u32,
        /// Remaining time hit a flush boundary.
        flush: bool,
    },
    /// A focus interval ran down to zero; the timer is now in Break.
    FocusCompleted {
        focus_minutes: f64,
        break_auto_started: bool,
        at: DateTime<Utc>,
    },
    /// A break ran down to zero; the timer is idle in Focus.
    BreakCompleted {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        mode: TimerMode,
        remaining_secs: u32,
        display: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Interval completions are the only events that change mode.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Event::FocusCompleted { .. } | Event::BreakCompleted { .. }
        )
    }
}
