//! Domain events describing check-in outcomes.
//!
//! Every decided scan emits an [`AttendanceEvent`] through the
//! [`super::EventBus`]. Events feed the live WebSocket view used by
//! checkpoint dashboards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Classification, EventId, RegistrationId, RejectionCode};

/// Domain event emitted after every check-in decision.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AttendanceEvent {
    /// A scan resolved and was written to the audit log.
    ScanRecorded {
        /// Event the registration belongs to.
        event_id: EventId,
        /// Scanned registration.
        registration_id: RegistrationId,
        /// Participant display name.
        participant_name: String,
        /// Timing classification.
        classification: Classification,
        /// Whether this scan marked first attendance.
        is_first: bool,
        /// Scan instant.
        checked_at: DateTime<Utc>,
    },

    /// A scan was rejected before anything was recorded as attendance.
    ScanRejected {
        /// Event the checkpoint is scoped to, if any.
        expected_event_id: Option<EventId>,
        /// Rejection code.
        code: RejectionCode,
        /// Rejection timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl AttendanceEvent {
    /// Returns the event ID this notification concerns, if any.
    #[must_use]
    pub fn event_id(&self) -> Option<EventId> {
        match self {
            Self::ScanRecorded { event_id, .. } => Some(*event_id),
            Self::ScanRejected {
                expected_event_id, ..
            } => *expected_event_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ScanRecorded { .. } => "scan_recorded",
            Self::ScanRejected { .. } => "scan_rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_serializes_with_tag() {
        let event = AttendanceEvent::ScanRecorded {
            event_id: EventId::new(),
            registration_id: RegistrationId::new(),
            participant_name: "Ada".to_string(),
            classification: Classification::Late,
            is_first: false,
            checked_at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"scan_recorded\""));
        assert!(json.contains("\"classification\":\"late\""));
    }

    #[test]
    fn general_checkpoint_rejection_has_no_event() {
        let event = AttendanceEvent::ScanRejected {
            expected_event_id: None,
            code: RejectionCode::NotFound,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_id(), None);
        assert_eq!(event.event_type_str(), "scan_rejected");
    }
}
