//! Append-only attendance audit trail.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{Classification, EventId, HandlerId, LogEntryId, RegistrationId, RejectionCode};

/// Scan origin metadata supplied by the checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanMetadata {
    /// Free-text label of the scanning device or desk.
    pub device_label: Option<String>,
    /// Operator or device account, when the session layer knows one.
    pub handled_by: Option<HandlerId>,
}

/// One recorded scan attempt. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceLogEntry {
    /// Entry identifier.
    pub id: LogEntryId,
    /// Registration the scan resolved to.
    pub registration_id: RegistrationId,
    /// Instant the scan is considered to have occurred.
    pub checked_at: DateTime<Utc>,
    /// Timing classification of the scan.
    pub classification: Classification,
    /// Origin of the scan, if supplied.
    pub device_label: Option<String>,
    /// Operator or device account, if known.
    pub handled_by: Option<HandlerId>,
    /// Set on audit-only entries for scans that were refused. Such entries
    /// never count as attendance or towards the classification totals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RejectionCode>,
    /// Checkpoint event a refused scan was presented at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_event_id: Option<EventId>,
    /// Instant the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Input to a single atomic recording step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScan {
    /// Registration being scanned.
    pub registration_id: RegistrationId,
    /// Scan instant, used for both `checked_at` and `first_checked_in_at`.
    pub checked_at: DateTime<Utc>,
    /// Timing classification.
    pub classification: Classification,
    /// Origin metadata.
    pub metadata: ScanMetadata,
    /// Rejection this entry audits, if any.
    pub rejection: Option<RejectionCode>,
    /// Checkpoint event of an audited rejection.
    pub checkpoint_event_id: Option<EventId>,
}

impl NewScan {
    /// Materializes the log entry this scan appends.
    #[must_use]
    pub fn into_entry(self, created_at: DateTime<Utc>) -> AttendanceLogEntry {
        AttendanceLogEntry {
            id: LogEntryId::new(),
            registration_id: self.registration_id,
            checked_at: self.checked_at,
            classification: self.classification,
            device_label: self.metadata.device_label,
            handled_by: self.metadata.handled_by,
            rejection: self.rejection,
            checkpoint_event_id: self.checkpoint_event_id,
            created_at,
        }
    }
}

impl AttendanceLogEntry {
    /// Returns `true` for audit-only entries of refused scans.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Result of the atomic recording step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedScan {
    /// The appended entry.
    pub entry: AttendanceLogEntry,
    /// Whether this scan moved the registration to `attended`.
    pub is_first: bool,
}
