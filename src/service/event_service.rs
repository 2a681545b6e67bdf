//! Event service: organizer-side setup and dashboard reads.
//!
//! Creates events and participants, issues registrations with fresh scan
//! tokens, and exposes the attendance counts dashboards consume. None of
//! these operations touch attendance state.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Event, EventId, Participant, ParticipantId, Registration};
use crate::error::GatewayError;
use crate::persistence::{AttendanceStore, AttendanceSummary, LogEntryView};

/// Fields needed to create an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Display title.
    pub title: String,
    /// Listed date; defaults to the start date.
    pub date: Option<NaiveDate>,
    /// Window start.
    pub start_at: DateTime<Utc>,
    /// Window end.
    pub end_at: DateTime<Utc>,
    /// On-time threshold in minutes.
    pub late_threshold_minutes: u32,
    /// Organizer account.
    pub owner_id: uuid::Uuid,
}

/// Organizer-side operations around the check-in engine.
#[derive(Debug, Clone)]
pub struct EventService {
    store: Arc<dyn AttendanceStore>,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    /// Creates and stores an event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a blank title or an
    /// inverted window, or a persistence error.
    pub async fn create_event(&self, new: NewEvent) -> Result<Event, GatewayError> {
        let date = new.date.unwrap_or_else(|| new.start_at.date_naive());
        let event = Event::new(
            &new.title,
            date,
            new.start_at,
            new.end_at,
            new.late_threshold_minutes,
            new.owner_id,
        )?;
        self.store.insert_event(&event).await?;
        tracing::info!(event_id = %event.id, title = %event.title, "event created");
        Ok(event)
    }

    /// Returns an event by ID.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if it does not exist.
    pub async fn get_event(&self, event_id: EventId) -> Result<Event, GatewayError> {
        self.store
            .find_event(event_id)
            .await?
            .ok_or(GatewayError::EventNotFound(*event_id.as_uuid()))
    }

    /// Creates and stores a participant.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a blank name, or a
    /// persistence error.
    pub async fn create_participant(
        &self,
        name: &str,
        code: Option<&str>,
        email: Option<&str>,
    ) -> Result<Participant, GatewayError> {
        let participant = Participant::new(name, code, email)?;
        self.store.insert_participant(&participant).await?;
        tracing::info!(participant_id = %participant.id, "participant created");
        Ok(participant)
    }

    /// Registers a participant for an event and issues a new scan token.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`],
    /// [`GatewayError::ParticipantNotFound`], or
    /// [`GatewayError::AlreadyRegistered`].
    pub async fn register_participant(
        &self,
        event_id: EventId,
        participant_id: ParticipantId,
    ) -> Result<Registration, GatewayError> {
        self.get_event(event_id).await?;
        self.store
            .find_participant(participant_id)
            .await?
            .ok_or(GatewayError::ParticipantNotFound(*participant_id.as_uuid()))?;

        let registration = Registration::issue(event_id, participant_id);
        self.store.insert_registration(&registration).await?;
        tracing::info!(
            %event_id,
            %participant_id,
            registration_id = %registration.id,
            "participant registered"
        );
        Ok(registration)
    }

    /// Returns dashboard counts for an event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if the event does not exist.
    pub async fn attendance_summary(
        &self,
        event_id: EventId,
    ) -> Result<AttendanceSummary, GatewayError> {
        self.get_event(event_id).await?;
        self.store.attendance_summary(event_id).await
    }

    /// Returns one page of the event's attendance log, newest first, and
    /// the total entry count.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if the event does not exist.
    pub async fn attendance_log(
        &self,
        event_id: EventId,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<LogEntryView>, u64), GatewayError> {
        self.get_event(event_id).await?;
        self.store.list_log_entries(event_id, offset, limit).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use chrono::Duration;

    fn service() -> EventService {
        EventService::new(Arc::new(MemoryStore::new()))
    }

    fn new_event() -> NewEvent {
        let start = Utc::now();
        NewEvent {
            title: "Workshop".to_string(),
            date: None,
            start_at: start,
            end_at: start + Duration::hours(2),
            late_threshold_minutes: 15,
            owner_id: uuid::Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn create_event_defaults_date_to_start() {
        let svc = service();
        let new = new_event();
        let expected = new.start_at.date_naive();
        let Ok(event) = svc.create_event(new).await else {
            panic!("create failed");
        };
        assert_eq!(event.date, expected);
        assert!(svc.get_event(event.id).await.is_ok());
    }

    #[tokio::test]
    async fn get_missing_event_is_not_found() {
        assert!(matches!(
            service().get_event(EventId::new()).await,
            Err(GatewayError::EventNotFound(_))
        ));
    }

    #[tokio::test]
    async fn register_issues_unique_tokens() {
        let svc = service();
        let Ok(event) = svc.create_event(new_event()).await else {
            panic!("create failed");
        };
        let Ok(a) = svc.create_participant("Ada", None, None).await else {
            panic!("create failed");
        };
        let Ok(b) = svc.create_participant("Grace", Some("G-1"), None).await else {
            panic!("create failed");
        };
        let Ok(ra) = svc.register_participant(event.id, a.id).await else {
            panic!("register failed");
        };
        let Ok(rb) = svc.register_participant(event.id, b.id).await else {
            panic!("register failed");
        };
        assert_ne!(ra.qr_token, rb.qr_token);

        let Ok(summary) = svc.attendance_summary(event.id).await else {
            panic!("summary failed");
        };
        assert_eq!(summary.registered, 2);
        assert_eq!(summary.attended, 0);
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let svc = service();
        let Ok(event) = svc.create_event(new_event()).await else {
            panic!("create failed");
        };
        let Ok(p) = svc.create_participant("Ada", None, None).await else {
            panic!("create failed");
        };
        assert!(svc.register_participant(event.id, p.id).await.is_ok());
        assert!(matches!(
            svc.register_participant(event.id, p.id).await,
            Err(GatewayError::AlreadyRegistered { .. })
        ));
    }

    #[tokio::test]
    async fn register_unknown_participant_fails() {
        let svc = service();
        let Ok(event) = svc.create_event(new_event()).await else {
            panic!("create failed");
        };
        assert!(matches!(
            svc.register_participant(event.id, ParticipantId::new()).await,
            Err(GatewayError::ParticipantNotFound(_))
        ));
    }
}
