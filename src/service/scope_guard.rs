//! Checkpoint scoping.
//!
//! A token proves registration for exactly one event. An event-scoped
//! checkpoint must refuse tokens for any other event; the general
//! checkpoint accepts all of them.

use crate::domain::{CheckInRejection, EventId};

/// Verifies that a registration for `actual` may be checked in at a
/// checkpoint scoped to `expected`.
///
/// # Errors
///
/// Returns [`CheckInRejection::WrongEvent`] when `expected` is present and
/// differs from `actual`.
pub fn ensure_scope(actual: EventId, expected: Option<EventId>) -> Result<(), CheckInRejection> {
    match expected {
        Some(expected) if expected != actual => {
            Err(CheckInRejection::WrongEvent { expected, actual })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_checkpoint_accepts_any_event() {
        assert!(ensure_scope(EventId::new(), None).is_ok());
    }

    #[test]
    fn matching_event_passes() {
        let id = EventId::new();
        assert!(ensure_scope(id, Some(id)).is_ok());
    }

    #[test]
    fn other_event_is_rejected() {
        let actual = EventId::new();
        let expected = EventId::new();
        assert_eq!(
            ensure_scope(actual, Some(expected)),
            Err(CheckInRejection::WrongEvent { expected, actual })
        );
    }
}
