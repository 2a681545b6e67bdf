//! Domain layer: entities, the time-window classifier, and event system.
//!
//! This module contains the server-side domain model including entity
//! identity, events and participants, registrations with their scan tokens,
//! the append-only attendance log, and the event bus for broadcasting
//! check-in outcomes.

pub mod attendance_event;
pub mod attendance_log;
pub mod clock;
pub mod event;
pub mod event_bus;
pub mod ids;
pub mod registration;
pub mod rejection;
pub mod time_window;

pub use attendance_event::AttendanceEvent;
pub use attendance_log::{AttendanceLogEntry, NewScan, RecordedScan, ScanMetadata};
pub use clock::{Clock, ManualClock, SystemClock};
pub use event::{Event, Participant};
pub use event_bus::EventBus;
pub use ids::{EventId, HandlerId, LogEntryId, ParticipantId, RegistrationId};
pub use registration::{Registration, RegistrationStatus, ResolvedRegistration};
pub use rejection::{CheckInRejection, RejectionCode};
pub use time_window::{Classification, classify};
