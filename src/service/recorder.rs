//! Attendance recording.
//!
//! [`AttendanceRecorder`] is the only writer of log entries and of the
//! first-attendance marker. The atomicity of the read-then-set step is
//! delegated to [`AttendanceStore::record_scan`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    AttendanceLogEntry, Classification, EventId, NewScan, RecordedScan, RegistrationId,
    RejectionCode, ScanMetadata,
};
use crate::error::GatewayError;
use crate::persistence::AttendanceStore;

/// Writes scan outcomes to the attendance store.
#[derive(Debug, Clone)]
pub struct AttendanceRecorder {
    store: Arc<dyn AttendanceStore>,
}

impl AttendanceRecorder {
    /// Creates a recorder over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    /// Appends one log entry and marks first attendance when this is the
    /// first non-invalid scan of the registration.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the transaction
    /// fails; in that case nothing was written.
    pub async fn record(
        &self,
        registration_id: RegistrationId,
        classification: Classification,
        checked_at: DateTime<Utc>,
        metadata: ScanMetadata,
    ) -> Result<RecordedScan, GatewayError> {
        let recorded = self
            .store
            .record_scan(NewScan {
                registration_id,
                checked_at,
                classification,
                metadata,
                rejection: None,
                checkpoint_event_id: None,
            })
            .await?;

        tracing::info!(
            %registration_id,
            %classification,
            is_first = recorded.is_first,
            "scan recorded"
        );
        Ok(recorded)
    }

    /// Appends an audit-only entry for a scan refused at the `checkpoint`
    /// of another event. The entry carries the `WRONG_EVENT` marker and the
    /// timing the scan would have had for its own event; the registration
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on storage failure.
    pub async fn audit_wrong_event(
        &self,
        registration_id: RegistrationId,
        checkpoint: EventId,
        classification: Classification,
        checked_at: DateTime<Utc>,
        metadata: ScanMetadata,
    ) -> Result<AttendanceLogEntry, GatewayError> {
        let entry = self
            .store
            .append_audit_entry(NewScan {
                registration_id,
                checked_at,
                classification,
                metadata,
                rejection: Some(RejectionCode::WrongEvent),
                checkpoint_event_id: Some(checkpoint),
            })
            .await?;

        tracing::info!(
            %registration_id,
            checkpoint_event_id = %checkpoint,
            "wrong-event scan audited"
        );
        Ok(entry)
    }
}
