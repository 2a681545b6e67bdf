//! Event attendee registrations.
//!
//! A [`Registration`] binds one participant to one event and carries the
//! secret scan token plus the first-attendance marker. Only the attendance
//! recorder may move a registration from `registered` to `attended`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Event, EventId, Participant, ParticipantId, RegistrationId};

/// Lifecycle of a registration. Only `Registered → Attended` is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Registered, not yet seen at a checkpoint.
    Registered,
    /// At least one non-invalid scan has been recorded.
    Attended,
}

impl RegistrationStatus {
    /// Returns the wire/database label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Attended => "attended",
        }
    }
}

impl std::str::FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(Self::Registered),
            "attended" => Ok(Self::Attended),
            other => Err(format!("unknown registration status: {other}")),
        }
    }
}

/// Join record between an event and a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Registration identifier.
    pub id: RegistrationId,
    /// Owning event.
    pub event_id: EventId,
    /// Registered participant.
    pub participant_id: ParticipantId,
    /// Opaque, globally unique scan token.
    pub qr_token: String,
    /// Current lifecycle status.
    pub status: RegistrationStatus,
    /// Instant of the first non-invalid scan. Set at most once.
    pub first_checked_in_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// Creates a fresh registration with a newly issued token.
    #[must_use]
    pub fn issue(event_id: EventId, participant_id: ParticipantId) -> Self {
        Self {
            id: RegistrationId::new(),
            event_id,
            participant_id,
            qr_token: issue_token(),
            status: RegistrationStatus::Registered,
            first_checked_in_at: None,
        }
    }
}

/// Generates a new opaque scan token: 32 lowercase hex characters backed by
/// 122 random bits.
#[must_use]
pub fn issue_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// A registration together with the records a check-in response needs.
#[derive(Debug, Clone)]
pub struct ResolvedRegistration {
    /// The registration matched by token.
    pub registration: Registration,
    /// Its parent event.
    pub event: Event,
    /// The registered participant.
    pub participant: Participant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_registration_starts_registered() {
        let reg = Registration::issue(EventId::new(), ParticipantId::new());
        assert_eq!(reg.status, RegistrationStatus::Registered);
        assert!(reg.first_checked_in_at.is_none());
    }

    #[test]
    fn tokens_are_opaque_hex_and_unique() {
        let a = issue_token();
        let b = issue_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn status_labels_parse() {
        assert_eq!("attended".parse(), Ok(RegistrationStatus::Attended));
        assert_eq!(
            RegistrationStatus::Registered.as_str().parse(),
            Ok(RegistrationStatus::Registered)
        );
        assert!("Attended".parse::<RegistrationStatus>().is_err());
    }
}
