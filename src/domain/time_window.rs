//! Attendance window classification.
//!
//! [`classify`] is a pure function of the scan instant and the event's
//! window. Both thresholds are inclusive: a scan at exactly
//! `start_at + late_threshold` is on time and a scan at exactly `end_at` is
//! late rather than invalid.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome label assigned to a single scan based on timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Scanned within the late threshold after the start.
    OnTime,
    /// Scanned after the late threshold but no later than the end.
    Late,
    /// Scanned before the event started.
    TooEarly,
    /// Scanned after the event ended. Recorded, but never counts as attendance.
    Invalid,
}

impl Classification {
    /// All classifications, in window order.
    pub const ALL: [Self; 4] = [Self::TooEarly, Self::OnTime, Self::Late, Self::Invalid];

    /// Returns the wire/database label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnTime => "on_time",
            Self::Late => "late",
            Self::TooEarly => "too_early",
            Self::Invalid => "invalid",
        }
    }

    /// Returns `true` if a scan with this classification may mark attendance.
    #[must_use]
    pub const fn counts_as_attendance(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_time" => Ok(Self::OnTime),
            "late" => Ok(Self::Late),
            "too_early" => Ok(Self::TooEarly),
            "invalid" => Ok(Self::Invalid),
            other => Err(format!("unknown classification: {other}")),
        }
    }
}

/// Classifies a scan at `now` against the window `[start_at, end_at]`.
///
/// Evaluated in order:
/// 1. `now < start_at` → [`Classification::TooEarly`]
/// 2. `now <= start_at + late_threshold_minutes` → [`Classification::OnTime`]
/// 3. `now <= end_at` → [`Classification::Late`]
/// 4. otherwise → [`Classification::Invalid`]
#[must_use]
pub fn classify(
    now: DateTime<Utc>,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    late_threshold_minutes: u32,
) -> Classification {
    if now < start_at {
        return Classification::TooEarly;
    }
    let on_time_until = start_at
        .checked_add_signed(Duration::minutes(i64::from(late_threshold_minutes)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    if now <= on_time_until {
        Classification::OnTime
    } else if now <= end_at {
        Classification::Late
    } else {
        Classification::Invalid
    }
}
