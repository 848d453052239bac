//! Messages accepted by the session controller and their replies.
//!
//! Requests are tagged by `type`; replies are plain objects whose shape
//! depends on the request, so [`Response`] is untagged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{SessionData, SessionRecord};
use crate::error::ProtocolError;
use crate::records::UserData;

/// Every `type` tag a [`Request`] can carry.
pub const REQUEST_TYPES: [&str; 6] = [
    "START_FOCUS_SESSION",
    "END_FOCUS_SESSION",
    "CHECK_PREMIUM",
    "UPDATE_USER_DATA",
    "SHOW_NOTIFICATION",
    "CONNECT_COWORKING",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    StartFocusSession {
        /// Minutes.
        duration: f64,
    },
    EndFocusSession {
        #[serde(rename = "sessionData", default)]
        session_data: SessionData,
    },
    CheckPremium,
    UpdateUserData {
        #[serde(rename = "userData")]
        user_data: UserData,
    },
    ShowNotification {
        title: String,
        message: String,
    },
    ConnectCoworking,
}

impl Request {
    /// Decode a raw message, separating unknown types from bad payloads.
    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        if !REQUEST_TYPES.contains(&kind) {
            return Err(ProtocolError::UnknownType(kind.to_string()));
        }
        serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::StartFocusSession { .. } => REQUEST_TYPES[0],
            Request::EndFocusSession { .. } => REQUEST_TYPES[1],
            Request::CheckPremium => REQUEST_TYPES[2],
            Request::UpdateUserData { .. } => REQUEST_TYPES[3],
            Request::ShowNotification { .. } => REQUEST_TYPES[4],
            Request::ConnectCoworking => REQUEST_TYPES[5],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    #[serde(rename_all = "camelCase")]
    SessionStarted {
        success: bool,
        session_info: SessionRecord,
    },
    Coworking {
        success: bool,
        message: String,
    },
    Failure {
        success: bool,
        error: String,
    },
    #[serde(rename_all = "camelCase")]
    Premium {
        is_premium: bool,
    },
    Ack {
        success: bool,
    },
}

impl Response {
    pub fn ok() -> Self {
        Response::Ack { success: true }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Response::Failure {
            success: false,
            error: error.to_string(),
        }
    }

    /// The `success` flag, or `true` for replies that carry none.
    pub fn is_success(&self) -> bool {
        match self {
            Response::SessionStarted { success, .. }
            | Response::Coworking { success, .. }
            | Response::Failure { success, .. }
            | Response::Ack { success } => *success,
            Response::Premium { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_tagged_requests() {
        let req = Request::from_json(r#"{"type":"START_FOCUS_SESSION","duration":25}"#).unwrap();
        assert_eq!(req, Request::StartFocusSession { duration: 25.0 });
        assert_eq!(req.kind(), "START_FOCUS_SESSION");

        let req = Request::from_json(r#"{"type":"CHECK_PREMIUM"}"#).unwrap();
        assert_eq!(req, Request::CheckPremium);

        let req = Request::from_json(
            r#"{"type":"END_FOCUS_SESSION","sessionData":{"actualDuration":10}}"#,
        )
        .unwrap();
        match req {
            Request::EndFocusSession { session_data } => {
                assert_eq!(session_data.actual_duration, Some(10.0))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn end_session_without_data_uses_defaults() {
        let req = Request::from_json(r#"{"type":"END_FOCUS_SESSION"}"#).unwrap();
        assert_eq!(
            req,
            Request::EndFocusSession {
                session_data: SessionData::default()
            }
        );
    }

    #[test]
    fn unknown_type_is_distinguished_from_bad_payload() {
        let err = Request::from_json(r#"{"type":"PING"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownType(ref t) if t == "PING"));

        let err = Request::from_json(r#"{"duration":5}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownType(_)));

        let err = Request::from_json(r#"{"type":"START_FOCUS_SESSION"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn responses_serialize_to_wire_shapes() {
        assert_eq!(serde_json::to_value(Response::ok()).unwrap(), json!({"success": true}));
        assert_eq!(
            serde_json::to_value(Response::Premium { is_premium: false }).unwrap(),
            json!({"isPremium": false})
        );
        assert_eq!(
            serde_json::to_value(Response::failure(ProtocolError::UnknownType("X".into())))
                .unwrap(),
            json!({"success": false, "error": "Unknown message type"})
        );
    }

    #[test]
    fn requests_serialize_with_type_tag() {
        let json = serde_json::to_value(Request::ShowNotification {
            title: "FocusFlow".into(),
            message: "hi".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "SHOW_NOTIFICATION");
    }
}
