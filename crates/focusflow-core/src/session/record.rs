use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The in-flight focus interval, persisted under `currentSession`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub start_time: DateTime<Utc>,
    /// Planned length in minutes.
    pub duration: f64,
    pub is_active: bool,
    pub id: String,
}

impl SessionRecord {
    pub fn begin(duration_minutes: f64, now: DateTime<Utc>) -> Self {
        Self {
            start_time: now,
            duration: duration_minutes,
            is_active: true,
            id: Uuid::new_v4().to_string(),
        }
    }

    /// Wall-clock minutes since the session started.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> f64 {
        (now - self.start_time).num_milliseconds() as f64 / 60_000.0
    }
}

/// Payload of `END_FOCUS_SESSION`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionData {
    /// Minutes actually focused. Preferred over the wall-clock delta.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_duration: Option<f64>,
    /// The sender already credited this interval to analytics.
    pub analytics_recorded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn elapsed_minutes_uses_start_time() {
        let start = Utc::now();
        let session = SessionRecord::begin(25.0, start);
        assert!(session.is_active);
        assert!((session.elapsed_minutes(start + Duration::seconds(90)) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn session_ids_are_unique() {
        let now = Utc::now();
        assert_ne!(SessionRecord::begin(25.0, now).id, SessionRecord::begin(25.0, now).id);
    }

    #[test]
    fn session_data_fields_are_optional() {
        let data: SessionData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, SessionData::default());
        let data: SessionData = serde_json::from_str(r#"{"actualDuration":12.5}"#).unwrap();
        assert_eq!(data.actual_duration, Some(12.5));
        assert!(!data.analytics_recorded);
    }
}
