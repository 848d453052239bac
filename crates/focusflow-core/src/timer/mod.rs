mod controller;
mod engine;
mod record;

pub use controller::{AttachOptions, TimerController, TimerServices};
pub use engine::{TimerEngine, TimerState, FLUSH_EVERY_SECS};
pub use record::{
    PomodoroRecord, TimerMode, KNOWN_SOUNDS, MAX_BREAK_MINUTES, MAX_FOCUS_MINUTES,
    MIN_BREAK_MINUTES, MIN_FOCUS_MINUTES,
};
