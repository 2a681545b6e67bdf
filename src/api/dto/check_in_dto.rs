//! Check-in request and response DTOs.
//!
//! These follow the checkpoint contract, so keys are camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Classification, EventId};
use crate::service::CheckInReceipt;

/// Request body for `POST /check-in` and `POST /events/{id}/check-in`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    /// Scanned or typed token. Surrounding whitespace is ignored.
    pub token: String,
    /// Event the checkpoint is scoped to.
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// Free-text origin of the scan.
    #[serde(default)]
    pub device_label: Option<String>,
    /// Instant captured by the device (honored only when the gateway
    /// trusts device clocks).
    #[serde(default)]
    pub scanned_at: Option<DateTime<Utc>>,
}

/// Successful check-in response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    /// Always `true`.
    pub ok: bool,
    /// Event title.
    pub event_title: String,
    /// Participant display name.
    pub participant_name: String,
    /// Participant external code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_code: Option<String>,
    /// Timing classification of this scan.
    pub status: Classification,
    /// Scan instant.
    pub checked_at: DateTime<Utc>,
    /// Whether this scan marked first attendance.
    pub is_first: bool,
}

impl From<CheckInReceipt> for CheckInResponse {
    fn from(receipt: CheckInReceipt) -> Self {
        Self {
            ok: true,
            event_title: receipt.event_title,
            participant_name: receipt.participant_name,
            participant_code: receipt.participant_code,
            status: receipt.classification,
            checked_at: receipt.checked_at,
            is_first: receipt.is_first,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::RegistrationId;

    #[test]
    fn request_accepts_camel_case() {
        let id = EventId::new();
        let json = format!(r#"{{"token":"abc","eventId":"{id}","deviceLabel":"Gate A"}}"#);
        let Ok(req) = serde_json::from_str::<CheckInRequest>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(req.token, "abc");
        assert_eq!(req.event_id, Some(id));
        assert_eq!(req.device_label.as_deref(), Some("Gate A"));
        assert!(req.scanned_at.is_none());
    }

    #[test]
    fn response_uses_contract_keys() {
        let response = CheckInResponse::from(CheckInReceipt {
            event_id: EventId::new(),
            registration_id: RegistrationId::new(),
            event_title: "Workshop".to_string(),
            participant_name: "Ada".to_string(),
            participant_code: None,
            classification: Classification::OnTime,
            checked_at: Utc::now(),
            is_first: true,
        });
        let Ok(value) = serde_json::to_value(&response) else {
            panic!("serialization failed");
        };
        assert_eq!(value.get("ok"), Some(&serde_json::json!(true)));
        assert_eq!(value.get("eventTitle"), Some(&serde_json::json!("Workshop")));
        assert_eq!(value.get("status"), Some(&serde_json::json!("on_time")));
        assert_eq!(value.get("isFirst"), Some(&serde_json::json!(true)));
        assert!(value.get("participantCode").is_none());
    }
}
