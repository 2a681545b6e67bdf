//! Persistence layer: the attendance store and its implementations.
//!
//! [`AttendanceStore`] is the only path through which registrations are
//! mutated and log entries appended. Two implementations are provided:
//! [`MemoryStore`] for development and tests, and [`PostgresStore`] backed
//! by `sqlx::PgPool`.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    AttendanceLogEntry, Classification, Event, EventId, NewScan, Participant, ParticipantId,
    RecordedScan, Registration, RegistrationId, ResolvedRegistration,
};
use crate::error::GatewayError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Per-classification scan counts for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ClassificationCounts {
    /// Scans before the start.
    pub too_early: u64,
    /// Scans within the late threshold.
    pub on_time: u64,
    /// Scans after the threshold but before the end.
    pub late: u64,
    /// Scans after the end.
    pub invalid: u64,
}

impl ClassificationCounts {
    /// Adds `n` scans of the given classification.
    pub fn add(&mut self, classification: Classification, n: u64) {
        let slot = match classification {
            Classification::TooEarly => &mut self.too_early,
            Classification::OnTime => &mut self.on_time,
            Classification::Late => &mut self.late,
            Classification::Invalid => &mut self.invalid,
        };
        *slot = slot.saturating_add(n);
    }

    /// Total number of scans.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.too_early + self.on_time + self.late + self.invalid
    }
}

/// Dashboard counts for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceSummary {
    /// Number of registrations.
    pub registered: u64,
    /// Registrations with a recorded first attendance.
    pub attended: u64,
    /// Scan counts by classification. Audited rejections are excluded.
    pub scans: ClassificationCounts,
    /// Audited scans of this event's tokens refused at another event's
    /// checkpoint.
    pub rejected_scans: u64,
}

/// A log entry joined with the participant it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LogEntryView {
    /// The stored entry.
    #[serde(flatten)]
    pub entry: AttendanceLogEntry,
    /// Participant display name.
    pub participant_name: String,
    /// Participant external code.
    pub participant_code: Option<String>,
}

/// Storage for events, participants, registrations and the attendance log.
///
/// Events and participants are read-only from the check-in path.
/// Registrations change only through [`AttendanceStore::record_scan`].
#[async_trait]
pub trait AttendanceStore: Send + Sync + Debug {
    /// Returns the registration whose token equals `token` exactly,
    /// together with its event and participant.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn find_registration_by_token(
        &self,
        token: &str,
    ) -> Result<Option<ResolvedRegistration>, GatewayError>;

    /// Appends one log entry and, unless the scan is `invalid`, marks first
    /// attendance if and only if it has not been marked yet. Both writes
    /// happen atomically; `is_first` is true for exactly one caller per
    /// registration even under concurrent scans.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure, in
    /// which case nothing was written.
    async fn record_scan(&self, scan: NewScan) -> Result<RecordedScan, GatewayError>;

    /// Appends an audit-only entry without touching the registration.
    /// Entries carrying a rejection marker are reported separately from the
    /// classification counts.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn append_audit_entry(&self, scan: NewScan) -> Result<AttendanceLogEntry, GatewayError>;

    /// Stores a new event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn insert_event(&self, event: &Event) -> Result<(), GatewayError>;

    /// Looks up an event by ID.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>, GatewayError>;

    /// Stores a new participant.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn insert_participant(&self, participant: &Participant) -> Result<(), GatewayError>;

    /// Looks up a participant by ID.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn find_participant(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<Participant>, GatewayError>;

    /// Stores a new registration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AlreadyRegistered`] if the participant is
    /// already registered for the event, or
    /// [`GatewayError::PersistenceError`] on storage failure (including a
    /// token collision).
    async fn insert_registration(&self, registration: &Registration) -> Result<(), GatewayError>;

    /// Looks up a registration by ID.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn find_registration(
        &self,
        registration_id: RegistrationId,
    ) -> Result<Option<Registration>, GatewayError>;

    /// Computes dashboard counts for an event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn attendance_summary(&self, event_id: EventId)
    -> Result<AttendanceSummary, GatewayError>;

    /// Returns one page of an event's log (newest first) and the total
    /// number of entries.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn list_log_entries(
        &self,
        event_id: EventId,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<LogEntryView>, u64), GatewayError>;
}
