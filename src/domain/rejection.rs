//! Permanent check-in rejections.
//!
//! A rejected scan is never retried: both cases are a deterministic
//! function of the token and the checkpoint.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EventId;

/// Wire code for a rejected check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    /// The token does not resolve to any registration.
    NotFound,
    /// The token belongs to a different event than the checkpoint expects.
    WrongEvent,
}

impl RejectionCode {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::WrongEvent => "WRONG_EVENT",
        }
    }
}

impl FromStr for RejectionCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_FOUND" => Ok(Self::NotFound),
            "WRONG_EVENT" => Ok(Self::WrongEvent),
            other => Err(format!("unknown rejection code: {other}")),
        }
    }
}

/// Why a scan was not recorded as a check-in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckInRejection {
    /// No registration carries the scanned token.
    #[error("no registration matches this token")]
    NotFound,

    /// The registration exists but belongs to another event.
    #[error("this token is registered for a different event")]
    WrongEvent {
        /// Event the checkpoint is scoped to.
        expected: EventId,
        /// Event the token is registered for.
        actual: EventId,
    },
}

impl CheckInRejection {
    /// Returns the wire code for this rejection.
    #[must_use]
    pub const fn code(&self) -> RejectionCode {
        match self {
            Self::NotFound => RejectionCode::NotFound,
            Self::WrongEvent { .. } => RejectionCode::WrongEvent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&RejectionCode::WrongEvent).ok().as_deref(),
            Some("\"WRONG_EVENT\"")
        );
        assert_eq!(RejectionCode::NotFound.as_str(), "NOT_FOUND");
    }

    #[test]
    fn rejection_maps_to_code() {
        let r = CheckInRejection::WrongEvent {
            expected: EventId::new(),
            actual: EventId::new(),
        };
        assert_eq!(r.code(), RejectionCode::WrongEvent);
        assert_eq!(CheckInRejection::NotFound.code(), RejectionCode::NotFound);
    }

    #[test]
    fn codes_parse_from_wire_labels() {
        assert_eq!("WRONG_EVENT".parse::<RejectionCode>(), Ok(RejectionCode::WrongEvent));
        assert_eq!("NOT_FOUND".parse::<RejectionCode>(), Ok(RejectionCode::NotFound));
        assert!("wrong_event".parse::<RejectionCode>().is_err());
    }
}
