//! Timer engine implementation.
//!
//! The engine is a pure state machine over a [`PomodoroRecord`]. It owns no
//! threads and performs no I/O - the UI controller drives `tick()` once per
//! second and turns the returned [`Event`]s into side effects.
//!
//! ## State Transitions
//!
//! ```text
//! Idle(Focus) <-> Running(Focus) --complete--> Running(Break) | Idle(Break)
//! Idle(Break) <-> Running(Break) --complete--> Idle(Focus)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(record);
//! engine.start(true);
//! // Once per second:
//! if let Some(event) = engine.tick() { /* flush, notify, ... */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::record::{PomodoroRecord, TimerMode};
use crate::events::Event;

/// Remaining-time granularity at which a running timer is flushed.
pub const FLUSH_EVERY_SECS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
}

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    record: PomodoroRecord,
    flush_every_secs: u32,
}

impl TimerEngine {
    pub fn new(record: PomodoroRecord) -> Self {
        Self {
            record,
            flush_every_secs: FLUSH_EVERY_SECS,
        }
    }

    /// Override the flush boundary (from config). Never below one second.
    pub fn with_flush_every(mut self, secs: u32) -> Self {
        self.flush_every_secs = secs.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn record(&self) -> &PomodoroRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut PomodoroRecord {
        &mut self.record
    }

    pub fn state(&self) -> TimerState {
        if self.record.is_running {
            TimerState::Running
        } else {
            TimerState::Idle
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.record.mode
    }

    pub fn is_running(&self) -> bool {
        self.record.is_running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.record.time_remaining
    }

    /// True when the current interval has been started and left part-way.
    /// A start outside an interval restores the full duration.
    pub fn is_mid_interval(&self) -> bool {
        let remaining = self.record.time_remaining;
        remaining > 0 && remaining < self.record.current_duration()
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            mode: self.record.mode,
            remaining_secs: self.record.time_remaining,
            display: self.record.display_remaining(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the timer. Returns `None` when it was already running.
    ///
    /// `reset_duration` restores the full interval first; the resume path
    /// after a reload passes `false` to keep the persisted remaining time.
    pub fn start(&mut self, reset_duration: bool) -> Option<Event> {
        if self.record.is_running {
            return None;
        }
        if reset_duration {
            self.record.time_remaining = self.record.current_duration();
        }
        self.record.is_running = true;
        Some(Event::TimerStarted {
            mode: self.record.mode,
            remaining_secs: self.record.time_remaining,
            at: Utc::now(),
        })
    }

    /// Pause at the current remaining time. Returns `None` when idle.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.record.is_running {
            return None;
        }
        self.record.is_running = false;
        Some(Event::TimerPaused {
            mode: self.record.mode,
            remaining_secs: self.record.time_remaining,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Event {
        self.pause();
        self.record.time_remaining = self.record.current_duration();
        Event::TimerReset {
            mode: self.record.mode,
            remaining_secs: self.record.time_remaining,
            at: Utc::now(),
        }
    }

    /// Advance one second. Returns `None` while idle.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.record.is_running {
            return None;
        }
        self.record.time_remaining = self.record.time_remaining.saturating_sub(1);
        if self.record.time_remaining == 0 {
            return Some(self.complete());
        }
        let flush = self.record.time_remaining % self.flush_every_secs == 0;
        Some(Event::Ticked {
            remaining_secs: self.record.time_remaining,
            flush,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) -> Event {
        match self.record.mode {
            TimerMode::Focus => {
                let focus_minutes = f64::from(self.record.focus_duration) / 60.0;
                self.record.mode = TimerMode::Break;
                self.record.time_remaining = self.record.break_duration;
                // Break auto-start keeps the duration that was just set.
                self.record.is_running = self.record.auto_start_breaks;
                Event::FocusCompleted {
                    focus_minutes,
                    break_auto_started: self.record.is_running,
                    at: Utc::now(),
                }
            }
            TimerMode::Break => {
                self.record.mode = TimerMode::Focus;
                self.record.time_remaining = self.record.focus_duration;
                self.record.is_running = false;
                Event::BreakCompleted { at: Utc::now() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn short_record(auto_start_breaks: bool) -> PomodoroRecord {
        PomodoroRecord {
            time_remaining: 3,
            focus_duration: 3,
            break_duration: 2,
            auto_start_breaks,
            ..PomodoroRecord::default()
        }
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::new(PomodoroRecord::default());
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(engine.start(true).is_some());
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.start(true).is_none(), "second start is a no-op");

        engine.tick();
        assert!(engine.pause().is_some());
        assert_eq!(engine.remaining_secs(), 1499);
        assert!(engine.pause().is_none(), "pause while idle is a no-op");

        assert!(engine.start(false).is_some());
        assert_eq!(engine.remaining_secs(), 1499);
    }

    #[test]
    fn start_with_reset_restores_full_duration() {
        let mut engine = TimerEngine::new(PomodoroRecord {
            time_remaining: 12,
            ..PomodoroRecord::default()
        });
        engine.start(true);
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn reset_stops_and_restores_break_duration() {
        let mut engine = TimerEngine::new(PomodoroRecord {
            mode: TimerMode::Break,
            time_remaining: 100,
            is_running: true,
            ..PomodoroRecord::default()
        });
        engine.reset();
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 300);
    }

    #[test]
    fn tick_while_idle_does_nothing() {
        let mut engine = TimerEngine::new(PomodoroRecord::default());
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn tick_flags_flush_on_fifteen_second_boundaries() {
        let mut engine = TimerEngine::new(PomodoroRecord {
            time_remaining: 31,
            ..PomodoroRecord::default()
        });
        engine.start(false);
        assert_eq!(
            engine.tick(),
            Some(Event::Ticked {
                remaining_secs: 30,
                flush: true
            })
        );
        assert_eq!(
            engine.tick(),
            Some(Event::Ticked {
                remaining_secs: 29,
                flush: false
            })
        );
    }

    #[test]
    fn focus_completion_with_auto_start_keeps_running_in_break() {
        let mut engine = TimerEngine::new(short_record(true));
        engine.start(false);
        engine.tick();
        engine.tick();
        let event = engine.tick().unwrap();
        match event {
            Event::FocusCompleted {
                focus_minutes,
                break_auto_started,
                ..
            } => {
                assert!((focus_minutes - 0.05).abs() < 1e-9);
                assert!(break_auto_started);
            }
            other => panic!("expected FocusCompleted, got {other:?}"),
        }
        assert_eq!(engine.mode(), TimerMode::Break);
        assert_eq!(engine.remaining_secs(), 2);
        assert!(engine.is_running());
    }

    #[test]
    fn focus_completion_without_auto_start_goes_idle() {
        let mut engine = TimerEngine::new(short_record(false));
        engine.start(false);
        for _ in 0..3 {
            engine.tick();
        }
        assert_eq!(engine.mode(), TimerMode::Break);
        assert_eq!(engine.remaining_secs(), 2);
        assert!(!engine.is_running());
    }

    #[test]
    fn break_completion_returns_to_idle_focus() {
        let mut engine = TimerEngine::new(PomodoroRecord {
            mode: TimerMode::Break,
            time_remaining: 1,
            ..PomodoroRecord::default()
        });
        engine.start(false);
        assert!(matches!(engine.tick(), Some(Event::BreakCompleted { .. })));
        assert_eq!(engine.mode(), TimerMode::Focus);
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(!engine.is_running());
    }

    #[test]
    fn running_record_at_zero_completes_on_next_tick() {
        let mut engine = TimerEngine::new(PomodoroRecord {
            is_running: true,
            time_remaining: 0,
            ..PomodoroRecord::default()
        });
        assert!(engine.tick().unwrap().is_completion());
    }

    #[test]
    fn mid_interval_detection() {
        let mut engine = TimerEngine::new(PomodoroRecord::default());
        assert!(!engine.is_mid_interval());
        engine.start(true);
        engine.tick();
        assert!(engine.is_mid_interval());
    }

    proptest! {
        #[test]
        fn reset_restores_focus_duration(minutes in 1u32..=60, elapsed in 0u32..100) {
            let mut record = PomodoroRecord::default();
            record.set_focus_minutes(minutes).unwrap();
            let mut engine = TimerEngine::new(record);
            engine.start(true);
            for _ in 0..elapsed.min(minutes * 60 - 1) {
                engine.tick();
            }
            engine.reset();
            prop_assert_eq!(engine.mode(), TimerMode::Focus);
            prop_assert_eq!(engine.remaining_secs(), minutes * 60);
        }

        #[test]
        fn ticks_decrease_remaining_exactly(start in 2u32..=3600, n in 1u32..=3600) {
            let n = n.min(start - 1);
            let mut engine = TimerEngine::new(PomodoroRecord {
                time_remaining: start,
                focus_duration: 3600,
                ..PomodoroRecord::default()
            });
            engine.start(false);
            for _ in 0..n {
                engine.tick();
            }
            prop_assert_eq!(engine.remaining_secs(), start - n);
            prop_assert_eq!(engine.mode(), TimerMode::Focus);
        }
    }
}
