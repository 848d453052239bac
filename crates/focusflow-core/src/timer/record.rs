//! The persisted Pomodoro record.
//!
//! Both controllers read and write this record under the `pomodoro` key.
//! Field names serialize in camelCase because the stored JSON is shared
//! with every other context that opens the store.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MIN_FOCUS_MINUTES: u32 = 1;
pub const MAX_FOCUS_MINUTES: u32 = 60;
pub const MIN_BREAK_MINUTES: u32 = 1;
pub const MAX_BREAK_MINUTES: u32 = 30;

/// Sound identifiers the notification player understands.
pub const KNOWN_SOUNDS: [&str; 5] = ["bell", "chime", "digital", "gentle", "none"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Focus,
    Break,
}

impl TimerMode {
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::Break => "Break",
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomodoroRecord {
    pub is_running: bool,
    pub mode: TimerMode,
    /// Seconds left in the current interval.
    pub time_remaining: u32,
    /// Seconds.
    pub focus_duration: u32,
    /// Seconds.
    pub break_duration: u32,
    pub auto_start_breaks: bool,
    pub notification_sound: String,
}

impl Default for PomodoroRecord {
    fn default() -> Self {
        Self {
            is_running: false,
            mode: TimerMode::Focus,
            time_remaining: 25 * 60,
            focus_duration: 25 * 60,
            break_duration: 5 * 60,
            auto_start_breaks: true,
            notification_sound: "bell".to_string(),
        }
    }
}

impl PomodoroRecord {
    /// Full length of the interval for `mode`, in seconds.
    pub fn duration_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_duration,
            TimerMode::Break => self.break_duration,
        }
    }

    pub fn current_duration(&self) -> u32 {
        self.duration_for(self.mode)
    }

    /// Clamp a record read from the store back into its valid ranges.
    pub fn normalized(mut self) -> Self {
        self.focus_duration = self
            .focus_duration
            .clamp(MIN_FOCUS_MINUTES * 60, MAX_FOCUS_MINUTES * 60);
        self.break_duration = self
            .break_duration
            .clamp(MIN_BREAK_MINUTES * 60, MAX_BREAK_MINUTES * 60);
        if self.time_remaining > self.current_duration() {
            self.time_remaining = self.current_duration();
        }
        if !KNOWN_SOUNDS.contains(&self.notification_sound.as_str()) {
            self.notification_sound = "bell".to_string();
        }
        self
    }

    pub fn set_focus_minutes(&mut self, minutes: u32) -> Result<(), ValidationError> {
        check_range("focus minutes", minutes, MIN_FOCUS_MINUTES, MAX_FOCUS_MINUTES)?;
        self.focus_duration = minutes * 60;
        if self.mode == TimerMode::Focus {
            self.fit_remaining();
        }
        Ok(())
    }

    pub fn set_break_minutes(&mut self, minutes: u32) -> Result<(), ValidationError> {
        check_range("break minutes", minutes, MIN_BREAK_MINUTES, MAX_BREAK_MINUTES)?;
        self.break_duration = minutes * 60;
        if self.mode == TimerMode::Break {
            self.fit_remaining();
        }
        Ok(())
    }

    /// An idle timer shows the new full length; a running one keeps its
    /// remaining time unless that now exceeds the interval.
    fn fit_remaining(&mut self) {
        let duration = self.current_duration();
        if self.is_running {
            self.time_remaining = self.time_remaining.min(duration);
        } else {
            self.time_remaining = duration;
        }
    }

    pub fn set_notification_sound(&mut self, sound: &str) -> Result<(), ValidationError> {
        if !KNOWN_SOUNDS.contains(&sound) {
            return Err(ValidationError::Unknown {
                kind: "notification sound".into(),
                value: sound.into(),
            });
        }
        self.notification_sound = sound.to_string();
        Ok(())
    }

    /// `MM:SS` rendering of the remaining time.
    pub fn display_remaining(&self) -> String {
        format!("{:02}:{:02}", self.time_remaining / 60, self.time_remaining % 60)
    }
}

fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.into(),
            min: min.into(),
            max: max.into(),
            value: value.into(),
        })
    }
}
