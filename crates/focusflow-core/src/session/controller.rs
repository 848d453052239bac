//! Long-lived session bookkeeping.
//!
//! The controller owns `currentSession`, credits finished focus time to
//! `analytics`, answers premium queries and runs the daily rollover. It is
//! driven either directly or through [`SessionClient`] messages handled one
//! at a time by a spawned task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::protocol::{Request, Response};
use super::record::{SessionData, SessionRecord};
use crate::analytics::{AnalyticsRecord, AnalyticsUpdater};
use crate::error::{CoreError, ProtocolError};
use crate::notify::{show_soft, Notification, Notifier};
use crate::records::UserData;
use crate::scheduled::{until_local_midnight, ScheduledTask};
use crate::storage::{SharedStore, StoreExt, StoreKey};

const CHANNEL_CAPACITY: usize = 32;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct SessionController {
    store: SharedStore,
    notifier: Arc<dyn Notifier>,
}

impl SessionController {
    pub fn new(store: SharedStore, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Persist a new active session of `duration_minutes`.
    pub fn start_session(&self, duration_minutes: f64) -> Result<SessionRecord, CoreError> {
        let session = SessionRecord::begin(duration_minutes, Utc::now());
        self.store.save(StoreKey::CurrentSession, &session)?;
        tracing::info!(id = %session.id, duration_minutes, "focus session started");
        Ok(session)
    }

    /// Close the current session. Returns the minutes credited to analytics.
    pub fn end_session(&self, data: &SessionData) -> Result<Option<f64>, CoreError> {
        let session: Option<SessionRecord> = self.store.load(StoreKey::CurrentSession)?;
        let elapsed = data
            .actual_duration
            .or_else(|| session.as_ref().map(|s| s.elapsed_minutes(Utc::now())))
            .unwrap_or(0.0);

        let credited = if data.analytics_recorded {
            tracing::debug!(elapsed, "analytics already recorded by sender");
            None
        } else if elapsed > 0.0 {
            AnalyticsUpdater::new(&*self.store).record_session(elapsed)?;
            Some(elapsed)
        } else {
            None
        };

        self.store.remove(StoreKey::CurrentSession)?;
        tracing::info!(
            id = session.as_ref().map(|s| s.id.as_str()).unwrap_or("-"),
            elapsed,
            "focus session ended"
        );
        Ok(credited)
    }

    /// `userData.isPremium`, false when missing or unreadable.
    pub fn check_premium_status(&self) -> bool {
        match self.store.load::<UserData>(StoreKey::UserData) {
            Ok(user) => user.is_some_and(|u| u.is_premium),
            Err(e) => {
                tracing::warn!(error = %e, "premium check failed");
                false
            }
        }
    }

    pub fn update_user_data(&self, user: &UserData) -> Result<(), CoreError> {
        self.store.save(StoreKey::UserData, user)?;
        Ok(())
    }

    /// Clear a session left active by a previous run, without crediting it.
    ///
    /// Returns true when an interrupted session was found.
    pub fn recover_interrupted_session(&self) -> bool {
        let session = match self.store.load::<SessionRecord>(StoreKey::CurrentSession) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "could not read current session");
                return false;
            }
        };
        let Some(session) = session.filter(|s| s.is_active) else {
            return false;
        };

        tracing::warn!(id = %session.id, start = %session.start_time, "found interrupted session");
        show_soft(
            self.notifier.as_ref(),
            Notification::new(
                "FocusFlow",
                "Your last focus session was interrupted and was not counted.",
            ),
        );
        if let Err(e) = self.store.remove(StoreKey::CurrentSession) {
            tracing::warn!(error = %e, "could not clear interrupted session");
        }
        true
    }

    /// Stamp `analytics.lastReset`. Weekly buckets are kept.
    pub fn daily_reset(&self) -> Result<AnalyticsRecord, CoreError> {
        let record = AnalyticsUpdater::new(&*self.store).mark_reset(Utc::now())?;
        tracing::info!("daily reset");
        Ok(record)
    }

    /// Run [`Self::daily_reset`] at the next local midnight and every 24h after.
    pub fn schedule_daily_reset(&self) -> ScheduledTask {
        let controller = self.clone();
        ScheduledTask::repeating("daily-reset", until_local_midnight(), DAY, move || {
            let controller = controller.clone();
            async move {
                if let Err(e) = controller.daily_reset() {
                    tracing::warn!(error = %e, "daily reset failed");
                }
            }
        })
    }

    /// Answer one request. Failures become `{success: false, error}`.
    pub fn handle(&self, request: Request) -> Response {
        tracing::debug!(kind = request.kind(), "handling message");
        match request {
            Request::StartFocusSession { duration } => match self.start_session(duration) {
                Ok(session_info) => Response::SessionStarted {
                    success: true,
                    session_info,
                },
                Err(e) => self.fail("START_FOCUS_SESSION", e),
            },
            Request::EndFocusSession { session_data } => match self.end_session(&session_data) {
                Ok(_) => Response::ok(),
                Err(e) => self.fail("END_FOCUS_SESSION", e),
            },
            Request::CheckPremium => Response::Premium {
                is_premium: self.check_premium_status(),
            },
            Request::UpdateUserData { user_data } => match self.update_user_data(&user_data) {
                Ok(()) => Response::ok(),
                Err(e) => self.fail("UPDATE_USER_DATA", e),
            },
            Request::ShowNotification { title, message } => {
                match self.notifier.show(&Notification::new(title, message)) {
                    Ok(()) => Response::ok(),
                    Err(e) => self.fail("SHOW_NOTIFICATION", e),
                }
            }
            Request::ConnectCoworking => Response::Coworking {
                success: true,
                message: "Connected to coworking server".to_string(),
            },
        }
    }

    pub fn handle_json(&self, raw: &str) -> Response {
        match Request::from_json(raw) {
            Ok(request) => self.handle(request),
            Err(e) => {
                tracing::warn!(error = %e, "rejected message");
                Response::failure(e)
            }
        }
    }

    fn fail(&self, kind: &str, err: CoreError) -> Response {
        tracing::warn!(kind, error = %err, "message handler failed");
        Response::failure(err)
    }

    /// Move the controller onto a task that serves [`SessionClient`]s.
    ///
    /// The task ends once every client has been dropped.
    pub fn spawn(self) -> (SessionClient, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Envelope>(CHANNEL_CAPACITY);
        let handle = tokio::spawn(async move {
            while let Some(Envelope { request, reply }) = rx.recv().await {
                let response = self.handle(request);
                if let Some(reply) = reply {
                    // Sender may have stopped waiting.
                    let _ = reply.send(response);
                }
            }
            tracing::debug!("session controller stopped");
        });
        (SessionClient { tx }, handle)
    }
}

struct Envelope {
    request: Request,
    reply: Option<oneshot::Sender<Response>>,
}

/// Sending half of a spawned [`SessionController`].
#[derive(Clone)]
pub struct SessionClient {
    tx: mpsc::Sender<Envelope>,
}

impl SessionClient {
    /// Send a request and wait for its reply.
    pub async fn send(&self, request: Request) -> Result<Response, ProtocolError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                request,
                reply: Some(reply),
            })
            .await
            .map_err(|_| ProtocolError::ControllerGone)?;
        rx.await.map_err(|_| ProtocolError::ControllerGone)
    }

    /// Decode and send a raw message. Decode failures are answered locally.
    pub async fn send_json(&self, raw: &str) -> Result<Response, ProtocolError> {
        match Request::from_json(raw) {
            Ok(request) => self.send(request).await,
            Err(e) => Ok(Response::failure(e)),
        }
    }

    /// Queue a request without waiting for the reply. Never blocks.
    pub fn notify(&self, request: Request) {
        let kind = request.kind();
        if let Err(e) = self.tx.try_send(Envelope {
            request,
            reply: None,
        }) {
            tracing::warn!(kind, error = %e, "could not deliver session message");
        }
    }
}
