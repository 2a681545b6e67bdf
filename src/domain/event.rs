//! Events and participants.
//!
//! Both are created by organizers outside the check-in path and are
//! read-only while a scan is being decided.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::time_window::{self, Classification};
use super::{EventId, ParticipantId};
use crate::error::GatewayError;

/// An organized event with an attendance window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Display title.
    pub title: String,
    /// Calendar date the event is listed under.
    pub date: NaiveDate,
    /// Start of the attendance window.
    pub start_at: DateTime<Utc>,
    /// End of the attendance window (inclusive).
    pub end_at: DateTime<Utc>,
    /// Minutes after `start_at` that still count as on time.
    pub late_threshold_minutes: u32,
    /// Organizer account that owns the event.
    pub owner_id: uuid::Uuid,
}

impl Event {
    /// Builds an event, enforcing `start_at < end_at` and a non-empty title.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the title is blank or the
    /// window is empty or inverted.
    pub fn new(
        title: &str,
        date: NaiveDate,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        late_threshold_minutes: u32,
        owner_id: uuid::Uuid,
    ) -> Result<Self, GatewayError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "event title must not be empty".to_string(),
            ));
        }
        if start_at >= end_at {
            return Err(GatewayError::InvalidRequest(format!(
                "event must start before it ends (start_at {start_at}, end_at {end_at})"
            )));
        }
        Ok(Self {
            id: EventId::new(),
            title: title.to_string(),
            date,
            start_at,
            end_at,
            late_threshold_minutes,
            owner_id,
        })
    }

    /// Classifies a scan at `now` against this event's window.
    #[must_use]
    pub fn classify(&self, now: DateTime<Utc>) -> Classification {
        time_window::classify(now, self.start_at, self.end_at, self.late_threshold_minutes)
    }
}

/// A person who can be registered for any number of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Participant {
    /// Participant identifier.
    pub id: ParticipantId,
    /// Optional external code (student number, badge number, ...).
    pub code: Option<String>,
    /// Display name.
    pub name: String,
    /// Optional contact email.
    pub email: Option<String>,
}

impl Participant {
    /// Builds a participant. Blank optional fields are stored as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the name is blank.
    pub fn new(
        name: &str,
        code: Option<&str>,
        email: Option<&str>,
    ) -> Result<Self, GatewayError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "participant name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: ParticipantId::new(),
            code: non_blank(code),
            name: name.to_string(),
            email: non_blank(email),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
