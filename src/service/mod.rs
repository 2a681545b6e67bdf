//! Service layer: business logic orchestration.
//!
//! [`CheckInService`] composes the token resolver, scope guard, window
//! classifier and attendance recorder into the check-in operation.
//! [`EventService`] covers organizer-side setup and dashboard reads.

pub mod check_in_service;
pub mod event_service;
pub mod recorder;
pub mod resolver;
pub mod scope_guard;

pub use check_in_service::{CheckInCommand, CheckInReceipt, CheckInService};
pub use event_service::{EventService, NewEvent};
