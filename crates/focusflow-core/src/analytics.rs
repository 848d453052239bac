//! Weekly focus analytics.
//!
//! `focusTime` is a seven-slot rolling display window indexed Monday = 0
//! through Sunday = 6. The daily reset never zeroes it.

use chrono::{DateTime, Datelike, Local, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::{KeyValueStore, StoreExt, StoreKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsRecord {
    /// Hours per weekday, Monday first. Stored unrounded.
    pub focus_time: [f64; 7],
    pub tasks_completed: u64,
    /// Running mean of recorded session lengths, in minutes.
    pub average_session_length: f64,
    pub last_reset: Option<DateTime<Utc>>,
    pub productive_time_of_day: String,
    pub pomodoro_efficiency: u32,
}

impl Default for AnalyticsRecord {
    fn default() -> Self {
        Self {
            focus_time: [0.0; 7],
            tasks_completed: 0,
            average_session_length: 0.0,
            last_reset: None,
            productive_time_of_day: "9 AM - 11 AM".to_string(),
            pomodoro_efficiency: 0,
        }
    }
}

/// Bucket index for a weekday, Monday = 0.
pub fn day_index(weekday: Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}

impl AnalyticsRecord {
    /// Add one completed session of `minutes` to the bucket for `weekday`.
    pub fn record_session(&mut self, minutes: f64, weekday: Weekday) {
        let idx = day_index(weekday);
        self.focus_time[idx] += minutes / 60.0;

        let old_count = self.tasks_completed as f64;
        self.average_session_length =
            (self.average_session_length * old_count + minutes) / (old_count + 1.0);
        self.tasks_completed += 1;
    }

    /// Buckets rounded to one decimal place, for rendering only.
    pub fn display_hours(&self) -> [f64; 7] {
        self.focus_time.map(|h| (h * 10.0).round() / 10.0)
    }

    pub fn total_hours(&self) -> f64 {
        self.focus_time.iter().sum()
    }

    /// Bar heights as percentages of the tallest bucket.
    pub fn bar_heights_pct(&self) -> [f64; 7] {
        let max = self.focus_time.iter().copied().fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return [0.0; 7];
        }
        self.focus_time.map(|h| h / max * 100.0)
    }
}

/// Read-modify-write of the `analytics` record.
pub struct AnalyticsUpdater<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> AnalyticsUpdater<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Record a session completed now, in local time.
    pub fn record_session(&self, minutes: f64) -> Result<AnalyticsRecord, StoreError> {
        self.record_session_on(minutes, Local::now().weekday())
    }

    pub fn record_session_on(
        &self,
        minutes: f64,
        weekday: Weekday,
    ) -> Result<AnalyticsRecord, StoreError> {
        let mut record: AnalyticsRecord = self.store.load_or_default(StoreKey::Analytics)?;
        record.record_session(minutes, weekday);
        self.store.save(StoreKey::Analytics, &record)?;
        tracing::debug!(
            minutes,
            tasks_completed = record.tasks_completed,
            "recorded focus session"
        );
        Ok(record)
    }

    /// Stamp the daily rollover. Buckets are left as they are.
    pub fn mark_reset(&self, at: DateTime<Utc>) -> Result<AnalyticsRecord, StoreError> {
        let mut record: AnalyticsRecord = self.store.load_or_default(StoreKey::Analytics)?;
        record.last_reset = Some(at);
        self.store.save(StoreKey::Analytics, &record)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn sunday_maps_to_last_bucket() {
        assert_eq!(day_index(Weekday::Sun), 6);
        assert_eq!(day_index(Weekday::Mon), 0);
        assert_eq!(day_index(Weekday::Sat), 5);
    }

    #[test]
    fn completion_on_sunday_updates_index_six() {
        let mut rec = AnalyticsRecord::default();
        rec.record_session(30.0, Weekday::Sun);
        assert_eq!(rec.focus_time[6], 0.5);
        assert_eq!(&rec.focus_time[..6], &[0.0; 6]);
    }

    #[test]
    fn average_of_twenty_and_forty_is_thirty() {
        let mut rec = AnalyticsRecord::default();
        rec.record_session(20.0, Weekday::Mon);
        rec.record_session(40.0, Weekday::Mon);
        assert_eq!(rec.tasks_completed, 2);
        assert!((rec.average_session_length - 30.0).abs() < 1e-9);
        assert!((rec.focus_time[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn display_rounds_but_storage_does_not() {
        let mut rec = AnalyticsRecord::default();
        rec.record_session(25.0, Weekday::Tue);
        assert!((rec.focus_time[1] - 25.0 / 60.0).abs() < 1e-12);
        assert_eq!(rec.display_hours()[1], 0.4);
    }

    #[test]
    fn bar_heights_scale_to_tallest() {
        let mut rec = AnalyticsRecord::default();
        assert_eq!(rec.bar_heights_pct(), [0.0; 7]);
        rec.focus_time[0] = 2.0;
        rec.focus_time[3] = 1.0;
        let bars = rec.bar_heights_pct();
        assert_eq!(bars[0], 100.0);
        assert_eq!(bars[3], 50.0);
    }

    #[test]
    fn updater_persists_and_keeps_buckets_on_reset() {
        let store = MemoryStore::new();
        let updater = AnalyticsUpdater::new(&store);
        updater.record_session_on(60.0, Weekday::Wed).unwrap();
        updater.mark_reset(Utc::now()).unwrap();

        let rec: AnalyticsRecord = store.load(StoreKey::Analytics).unwrap().unwrap();
        assert_eq!(rec.focus_time[2], 1.0);
        assert_eq!(rec.tasks_completed, 1);
        assert!(rec.last_reset.is_some());
    }
}
