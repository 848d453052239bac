//! The UI-side timer controller.
//!
//! A controller is created on attach from the persisted `pomodoro` record
//! and owns the per-second tick task until it is paused, detached or
//! dropped. Every transition is flushed back to the store, and a running
//! timer is additionally flushed whenever the remaining time crosses a
//! flush boundary, so a process that dies mid-interval loses at most that
//! much progress.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::{Instant, MissedTickBehavior};

use super::engine::{TimerEngine, FLUSH_EVERY_SECS};
use super::record::{PomodoroRecord, TimerMode};
use crate::analytics::AnalyticsUpdater;
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::notify::{show_soft, Notification, Notifier, SoundPlayer};
use crate::scheduled::ScheduledTask;
use crate::session::{Request, SessionClient, SessionData};
use crate::storage::{SharedStore, StoreExt, StoreKey, TimerConfig, MAX_FLUSH_EVERY_SECS};

/// The remaining time counts down by one per tick.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

const FOCUS_DONE: &str = "Focus session complete! Time for a break.";
const BREAK_DONE: &str = "Break complete! Ready for another focus session?";

#[derive(Debug, Clone, Copy)]
pub struct AttachOptions {
    pub flush_every_secs: u32,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            flush_every_secs: FLUSH_EVERY_SECS,
        }
    }
}

impl From<&TimerConfig> for AttachOptions {
    fn from(config: &TimerConfig) -> Self {
        Self {
            flush_every_secs: config.flush_every_secs.clamp(1, MAX_FLUSH_EVERY_SECS),
        }
    }
}

/// Side-effect collaborators of the timer.
#[derive(Clone)]
pub struct TimerServices {
    pub notifier: Arc<dyn Notifier>,
    pub sound: Arc<dyn SoundPlayer>,
    /// Session controller to report focus intervals to, if one is running.
    pub session: Option<SessionClient>,
}

struct State {
    engine: TimerEngine,
    ticker: Option<ScheduledTask>,
}

struct Inner {
    store: SharedStore,
    services: TimerServices,
    state: Mutex<State>,
    display: watch::Sender<PomodoroRecord>,
}

/// Handle to an attached timer. Dropping it stops the tick task.
pub struct TimerController {
    inner: Arc<Inner>,
}

impl TimerController {
    /// Load the persisted record and resume ticking if it was left running.
    pub async fn attach(store: SharedStore, services: TimerServices, options: AttachOptions) -> Self {
        let record = load_record(&store);
        let resume = record.is_running;
        let (display, _) = watch::channel(record.clone());

        let inner = Arc::new(Inner {
            store,
            services,
            state: Mutex::new(State {
                engine: TimerEngine::new(record).with_flush_every(options.flush_every_secs),
                ticker: None,
            }),
            display,
        });

        if resume {
            let mut state = inner.state.lock().await;
            tracing::info!(
                mode = %state.engine.mode(),
                remaining_secs = state.engine.remaining_secs(),
                "resuming running timer"
            );
            state.ticker = Some(spawn_ticker(&inner));
        }
        Self { inner }
    }

    pub async fn record(&self) -> PomodoroRecord {
        self.inner.state.lock().await.engine.record().clone()
    }

    pub async fn snapshot(&self) -> Event {
        self.inner.state.lock().await.engine.snapshot()
    }

    /// Watch the record as it changes, for rendering.
    pub fn subscribe(&self) -> watch::Receiver<PomodoroRecord> {
        self.inner.display.subscribe()
    }

    /// Interactive start: resumes a paused interval and restarts a finished one.
    pub async fn start(&self) -> Option<Event> {
        let reset_duration = !self.inner.state.lock().await.engine.is_mid_interval();
        self.start_with(reset_duration).await
    }

    pub async fn start_with(&self, reset_duration: bool) -> Option<Event> {
        let mut state = self.inner.state.lock().await;
        let event = state.engine.start(reset_duration)?;
        let record = state.engine.record().clone();
        self.inner.flush(&record);
        state.ticker = Some(spawn_ticker(&self.inner));
        drop(state);

        if record.mode == TimerMode::Focus {
            self.inner.send_session(Request::StartFocusSession {
                duration: f64::from(record.focus_duration) / 60.0,
            });
        }
        self.inner.publish(record);
        Some(event)
    }

    pub async fn pause(&self) -> Option<Event> {
        let mut state = self.inner.state.lock().await;
        let event = state.engine.pause()?;
        cancel_ticker(&mut state);
        let record = state.engine.record().clone();
        self.inner.flush(&record);
        drop(state);
        self.inner.publish(record);
        Some(event)
    }

    pub async fn reset(&self) -> Event {
        let mut state = self.inner.state.lock().await;
        let event = state.engine.reset();
        cancel_ticker(&mut state);
        let record = state.engine.record().clone();
        self.inner.flush(&record);
        drop(state);
        self.inner.publish(record);
        event
    }

    /// Advance one second by hand. The tick task calls the same path.
    pub async fn tick(&self) -> Option<Event> {
        self.inner.tick().await
    }

    /// Change settings on the record and persist them.
    pub async fn update_settings<F>(&self, change: F) -> Result<PomodoroRecord, CoreError>
    where
        F: FnOnce(&mut PomodoroRecord) -> Result<(), ValidationError>,
    {
        let mut state = self.inner.state.lock().await;
        change(state.engine.record_mut())?;
        let record = state.engine.record().clone();
        self.inner.store.save(StoreKey::Pomodoro, &record)?;
        drop(state);
        self.inner.publish(record.clone());
        Ok(record)
    }

    pub async fn is_ticking(&self) -> bool {
        let state = self.inner.state.lock().await;
        state.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Flush the record and stop ticking. A running timer stays marked
    /// running in the store so the next attach resumes it.
    pub async fn detach(self) {
        let mut state = self.inner.state.lock().await;
        cancel_ticker(&mut state);
        let record = state.engine.record().clone();
        self.inner.flush(&record);
        tracing::debug!(remaining_secs = record.time_remaining, "timer detached");
    }
}

impl Inner {
    async fn tick(&self) -> Option<Event> {
        let mut state = self.state.lock().await;
        let event = state.engine.tick()?;
        let record = state.engine.record().clone();
        match &event {
            Event::Ticked { flush: true, .. } => self.flush(&record),
            Event::Ticked { .. } => {}
            _ => self.flush(&record),
        }
        drop(state);

        match &event {
            Event::FocusCompleted { focus_minutes, .. } => {
                self.on_focus_completed(&record, *focus_minutes)
            }
            Event::BreakCompleted { .. } => self.on_break_completed(&record),
            _ => {}
        }
        self.publish(record);
        Some(event)
    }

    fn on_focus_completed(&self, record: &PomodoroRecord, focus_minutes: f64) {
        tracing::info!(focus_minutes, auto_break = record.is_running, "focus interval complete");
        self.play_sound(record);
        show_soft(
            self.services.notifier.as_ref(),
            Notification::new("FocusFlow", FOCUS_DONE),
        );
        let recorded = match AnalyticsUpdater::new(&*self.store).record_session(focus_minutes) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "could not record focus session");
                false
            }
        };
        self.send_session(Request::EndFocusSession {
            session_data: SessionData {
                actual_duration: Some(focus_minutes),
                analytics_recorded: recorded,
            },
        });
    }

    fn on_break_completed(&self, record: &PomodoroRecord) {
        tracing::info!("break interval complete");
        self.play_sound(record);
        show_soft(
            self.services.notifier.as_ref(),
            Notification::new("FocusFlow", BREAK_DONE),
        );
    }

    fn play_sound(&self, record: &PomodoroRecord) {
        if record.notification_sound != "none" {
            self.services.sound.play(&record.notification_sound);
        }
    }

    fn send_session(&self, request: Request) {
        match &self.services.session {
            Some(client) => client.notify(request),
            None => tracing::debug!(kind = request.kind(), "no session controller attached"),
        }
    }

    fn flush(&self, record: &PomodoroRecord) {
        if let Err(e) = self.store.save(StoreKey::Pomodoro, record) {
            tracing::warn!(error = %e, "failed to flush timer state");
        }
    }

    fn publish(&self, record: PomodoroRecord) {
        self.display.send_replace(record);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(mut ticker) = self.state.get_mut().ticker.take() {
            ticker.cancel();
        }
    }
}

fn cancel_ticker(state: &mut State) {
    if let Some(mut ticker) = state.ticker.take() {
        ticker.cancel();
    }
}

fn spawn_ticker(inner: &Arc<Inner>) -> ScheduledTask {
    let weak: Weak<Inner> = Arc::downgrade(inner);
    ScheduledTask::spawn("timer-tick", async move {
        let mut interval =
            tokio::time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let Some(inner) = weak.upgrade() else { break };
            inner.tick().await;
            let running = inner.state.lock().await.engine.is_running();
            if !running {
                break;
            }
        }
    })
}

fn load_record(store: &SharedStore) -> PomodoroRecord {
    match store.load::<PomodoroRecord>(StoreKey::Pomodoro) {
        Ok(Some(record)) => record.normalized(),
        Ok(None) => PomodoroRecord::default(),
        Err(e) => {
            tracing::warn!(error = %e, "could not load timer state, using defaults");
            PomodoroRecord::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;

    fn services(rec: &Arc<RecordingNotifier>) -> TimerServices {
        TimerServices {
            notifier: rec.clone(),
            sound: rec.clone(),
            session: None,
        }
    }

    fn stored(store: &MemoryStore) -> PomodoroRecord {
        store.load(StoreKey::Pomodoro).unwrap().unwrap()
    }

    #[tokio::test]
    async fn attach_without_record_uses_defaults() {
        let store = Arc::new(MemoryStore::new());
        let rec = Arc::new(RecordingNotifier::new());
        let timer = TimerController::attach(store, services(&rec), AttachOptions::default()).await;
        assert_eq!(timer.record().await, PomodoroRecord::default());
        assert!(!timer.is_ticking().await);
    }

    #[tokio::test]
    async fn attach_with_unreadable_store_falls_back() {
        let store = Arc::new(MemoryStore::new());
        store.fail_reads(true);
        let rec = Arc::new(RecordingNotifier::new());
        let timer =
            TimerController::attach(store.clone(), services(&rec), AttachOptions::default()).await;
        assert_eq!(timer.record().await, PomodoroRecord::default());
    }

    #[tokio::test(start_paused = true)]
    async fn start_pause_flushes_and_stops_ticking() {
        let store = Arc::new(MemoryStore::new());
        let rec = Arc::new(RecordingNotifier::new());
        let timer =
            TimerController::attach(store.clone(), services(&rec), AttachOptions::default()).await;

        assert!(timer.start().await.is_some());
        assert!(stored(&store).is_running);
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(timer.record().await.time_remaining, 1497);

        assert!(timer.pause().await.is_some());
        assert!(!timer.is_ticking().await);
        let persisted = stored(&store);
        assert!(!persisted.is_running);
        assert_eq!(persisted.time_remaining, 1497);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.record().await.time_remaining, 1497);
        assert!(timer.pause().await.is_none());

        // Mid-interval start resumes instead of restoring the full duration.
        timer.start().await;
        assert_eq!(timer.record().await.time_remaining, 1497);
    }

    #[tokio::test]
    async fn update_settings_validates_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let rec = Arc::new(RecordingNotifier::new());
        let timer =
            TimerController::attach(store.clone(), services(&rec), AttachOptions::default()).await;

        let record = timer.update_settings(|r| r.set_focus_minutes(50)).await.unwrap();
        assert_eq!(record.time_remaining, 3000);
        assert_eq!(stored(&store).focus_duration, 3000);

        assert!(timer.update_settings(|r| r.set_break_minutes(45)).await.is_err());
        assert_eq!(stored(&store).break_duration, 300);
    }

    #[tokio::test(start_paused = true)]
    async fn shortening_running_focus_clamps_remaining_everywhere() {
        let store = Arc::new(MemoryStore::new());
        let rec = Arc::new(RecordingNotifier::new());
        let timer =
            TimerController::attach(store.clone(), services(&rec), AttachOptions::default()).await;
        timer.start().await;

        let record = timer.update_settings(|r| r.set_focus_minutes(5)).await.unwrap();
        assert!(record.is_running);
        assert_eq!(record.time_remaining, 300);
        assert_eq!(stored(&store), record);

        // A fresh attach agrees with what the running controller holds.
        timer.pause().await;
        let reloaded = TimerController::attach(store, services(&rec), AttachOptions::default()).await;
        assert_eq!(reloaded.record().await, timer.record().await);
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let store = Arc::new(MemoryStore::new());
        let rec = Arc::new(RecordingNotifier::new());
        let timer = TimerController::attach(store, services(&rec), AttachOptions::default()).await;
        let mut rx = timer.subscribe();
        timer.start().await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_running);
        timer.reset().await;
        assert!(!rx.borrow_and_update().is_running);
    }
}
