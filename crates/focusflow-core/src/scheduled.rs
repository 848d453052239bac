//! Owned handles for background tokio tasks.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// A spawned task that is aborted on `cancel()` or when dropped.
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn spawn<F>(name: &'static str, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::debug!(task = name, "spawning scheduled task");
        Self {
            name,
            handle: Some(tokio::spawn(fut)),
        }
    }

    /// Run `f` every `period`, first after `delay`. Late ticks are skipped.
    pub fn repeating<F, Fut>(name: &'static str, delay: Duration, period: Duration, mut f: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(name, async move {
            let mut interval = tokio::time::interval_at(Instant::now() + delay, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                f().await;
            }
        })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(task = self.name, "cancelled scheduled task");
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start of the next calendar day in `now`'s timezone.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();
    loop {
        date = date.succ_opt().unwrap_or(date);
        let Some(naive) = date.and_hms_opt(0, 0, 0) else {
            continue;
        };
        // Midnight can fall in a DST gap; use the first instant that exists.
        if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
            if dt > *now {
                return dt;
            }
        }
        if let Some(dt) = tz
            .from_local_datetime(&(naive + ChronoDuration::hours(1)))
            .earliest()
        {
            if dt > *now {
                return dt;
            }
        }
    }
}

/// Delay until the next local midnight.
pub fn until_local_midnight() -> Duration {
    let now = Local::now();
    (next_midnight(&now) - now)
        .to_std()
        .unwrap_or(Duration::from_secs(24 * 60 * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn next_midnight_is_start_of_following_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 22, 15, 0).unwrap();
        let next = next_midnight(&now);
        assert_eq!(
            next.date_naive(),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
        assert_eq!(next.time(), chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn next_midnight_at_midnight_moves_a_full_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(next_midnight(&now) - now, ChronoDuration::days(1));
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_fires_after_delay_then_every_period() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let _task = ScheduledTask::repeating(
            "counter",
            Duration::from_secs(10),
            Duration::from_secs(60),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            },
        );

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_the_task() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let task = ScheduledTask::repeating(
            "counter",
            Duration::ZERO,
            Duration::from_secs(1),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            },
        );
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let seen = hits.load(Ordering::SeqCst);
        drop(task);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(hits.load(Ordering::SeqCst), seen);
    }
}
