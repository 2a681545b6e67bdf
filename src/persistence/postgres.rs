//! PostgreSQL implementation of the attendance store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{
    EventRow, LogEntryRow, LogEntryViewRow, ParticipantRow, RegistrationRow, ResolvedRow,
};
use super::{AttendanceStore, AttendanceSummary, ClassificationCounts, LogEntryView};
use crate::config::GatewayConfig;
use crate::domain::{
    AttendanceLogEntry, Classification, Event, EventId, NewScan, Participant, ParticipantId,
    RecordedScan, Registration, RegistrationId, RegistrationStatus, RejectionCode,
    ResolvedRegistration,
};
use crate::error::GatewayError;

const UNIQUE_REGISTRATION: &str = "event_registrations_event_participant_key";
const REGISTRATION_EVENT_FK: &str = "event_registrations_event_id_fkey";
const REGISTRATION_PARTICIPANT_FK: &str = "event_registrations_participant_id_fkey";

/// PostgreSQL-backed attendance store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool using the database settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the database is
    /// unreachable within the configured timeout.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), GatewayError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))
    }

    async fn insert_log_row(
        conn: &mut sqlx::PgConnection,
        scan: &NewScan,
    ) -> Result<DateTime<Utc>, GatewayError> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            "INSERT INTO attendance_logs \
             (id, registration_id, checked_at, classification, device_label, handled_by, \
              rejection_code, checkpoint_event_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING created_at",
        )
        .bind(uuid::Uuid::new_v4())
        .bind(*scan.registration_id.as_uuid())
        .bind(scan.checked_at)
        .bind(scan.classification.as_str())
        .bind(scan.metadata.device_label.as_deref())
        .bind(scan.metadata.handled_by.map(uuid::Uuid::from))
        .bind(scan.rejection.map(RejectionCode::as_str))
        .bind(scan.checkpoint_event_id.map(uuid::Uuid::from))
        .fetch_one(conn)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))
    }
}

/// Maps a registration insert failure onto the domain error it represents.
fn registration_insert_error(err: &sqlx::Error, registration: &Registration) -> GatewayError {
    let constraint = err.as_database_error().and_then(|d| d.constraint());
    match constraint {
        Some(UNIQUE_REGISTRATION) => GatewayError::AlreadyRegistered {
            event_id: *registration.event_id.as_uuid(),
            participant_id: *registration.participant_id.as_uuid(),
        },
        Some(REGISTRATION_EVENT_FK) => GatewayError::EventNotFound(*registration.event_id.as_uuid()),
        Some(REGISTRATION_PARTICIPANT_FK) => {
            GatewayError::ParticipantNotFound(*registration.participant_id.as_uuid())
        }
        _ => GatewayError::PersistenceError(err.to_string()),
    }
}

fn to_u64(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl AttendanceStore for PostgresStore {
    async fn find_registration_by_token(
        &self,
        token: &str,
    ) -> Result<Option<ResolvedRegistration>, GatewayError> {
        let row = sqlx::query_as::<_, ResolvedRow>(
            "SELECT r.id, r.event_id, r.participant_id, r.qr_token, r.status, r.first_checked_in_at, \
                    e.title AS event_title, e.event_date, e.start_at, e.end_at, \
                    e.late_threshold_minutes, e.owner_id, \
                    p.code AS participant_code, p.name AS participant_name, \
                    p.email AS participant_email \
             FROM event_registrations r \
             JOIN events e ON e.id = r.event_id \
             JOIN participants p ON p.id = r.participant_id \
             WHERE r.qr_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        row.map(ResolvedRegistration::try_from).transpose()
    }

    async fn record_scan(&self, scan: NewScan) -> Result<RecordedScan, GatewayError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let created_at = Self::insert_log_row(&mut tx, &scan).await?;

        // Row-level guard: concurrent updates on the same registration
        // serialize here and only one sees first_checked_in_at IS NULL.
        let is_first = if scan.classification.counts_as_attendance() {
            let result = sqlx::query(
                "UPDATE event_registrations \
                 SET first_checked_in_at = $1, status = $2 \
                 WHERE id = $3 AND first_checked_in_at IS NULL",
            )
            .bind(scan.checked_at)
            .bind(RegistrationStatus::Attended.as_str())
            .bind(*scan.registration_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
            result.rows_affected() == 1
        } else {
            false
        };

        tx.commit()
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(RecordedScan {
            entry: scan.into_entry(created_at),
            is_first,
        })
    }

    async fn append_audit_entry(&self, scan: NewScan) -> Result<AttendanceLogEntry, GatewayError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        let created_at = Self::insert_log_row(&mut conn, &scan).await?;
        Ok(scan.into_entry(created_at))
    }

    async fn insert_event(&self, event: &Event) -> Result<(), GatewayError> {
        let late = i32::try_from(event.late_threshold_minutes).map_err(|_| {
            GatewayError::InvalidRequest("late threshold out of range".to_string())
        })?;
        sqlx::query(
            "INSERT INTO events \
             (id, title, event_date, start_at, end_at, late_threshold_minutes, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*event.id.as_uuid())
        .bind(&event.title)
        .bind(event.date)
        .bind(event.start_at)
        .bind(event.end_at)
        .bind(late)
        .bind(event.owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>, GatewayError> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, title, event_date, start_at, end_at, late_threshold_minutes, owner_id \
             FROM events WHERE id = $1",
        )
        .bind(*event_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        row.map(Event::try_from).transpose()
    }

    async fn insert_participant(&self, participant: &Participant) -> Result<(), GatewayError> {
        sqlx::query("INSERT INTO participants (id, code, name, email) VALUES ($1, $2, $3, $4)")
            .bind(*participant.id.as_uuid())
            .bind(participant.code.as_deref())
            .bind(&participant.name)
            .bind(participant.email.as_deref())
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    async fn find_participant(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<Participant>, GatewayError> {
        let row = sqlx::query_as::<_, ParticipantRow>(
            "SELECT id, code, name, email FROM participants WHERE id = $1",
        )
        .bind(*participant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(row.map(Participant::from))
    }

    async fn insert_registration(&self, registration: &Registration) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO event_registrations \
             (id, event_id, participant_id, qr_token, status, first_checked_in_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*registration.id.as_uuid())
        .bind(*registration.event_id.as_uuid())
        .bind(*registration.participant_id.as_uuid())
        .bind(&registration.qr_token)
        .bind(registration.status.as_str())
        .bind(registration.first_checked_in_at)
        .execute(&self.pool)
        .await
        .map_err(|e| registration_insert_error(&e, registration))?;
        Ok(())
    }

    async fn find_registration(
        &self,
        registration_id: RegistrationId,
    ) -> Result<Option<Registration>, GatewayError> {
        let row = sqlx::query_as::<_, RegistrationRow>(
            "SELECT id, event_id, participant_id, qr_token, status, first_checked_in_at \
             FROM event_registrations WHERE id = $1",
        )
        .bind(*registration_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        row.map(Registration::try_from).transpose()
    }

    async fn attendance_summary(
        &self,
        event_id: EventId,
    ) -> Result<AttendanceSummary, GatewayError> {
        let (registered, attended) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(first_checked_in_at) \
             FROM event_registrations WHERE event_id = $1",
        )
        .bind(*event_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT l.classification, COUNT(*) \
             FROM attendance_logs l \
             JOIN event_registrations r ON r.id = l.registration_id \
             WHERE r.event_id = $1 AND l.rejection_code IS NULL \
             GROUP BY l.classification",
        )
        .bind(*event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let mut scans = ClassificationCounts::default();
        for (label, count) in rows {
            let classification = label
                .parse::<Classification>()
                .map_err(GatewayError::PersistenceError)?;
            scans.add(classification, to_u64(count));
        }

        let rejected = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance_logs l \
             JOIN event_registrations r ON r.id = l.registration_id \
             WHERE r.event_id = $1 AND l.rejection_code IS NOT NULL",
        )
        .bind(*event_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(AttendanceSummary {
            registered: to_u64(registered),
            attended: to_u64(attended),
            scans,
            rejected_scans: to_u64(rejected),
        })
    }

    async fn list_log_entries(
        &self,
        event_id: EventId,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<LogEntryView>, u64), GatewayError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance_logs l \
             JOIN event_registrations r ON r.id = l.registration_id \
             WHERE r.event_id = $1",
        )
        .bind(*event_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let rows = sqlx::query_as::<_, LogEntryViewRow>(
            "SELECT l.id, l.registration_id, l.checked_at, l.classification, l.device_label, \
                    l.handled_by, l.rejection_code, l.checkpoint_event_id, l.created_at, \
                    p.name AS participant_name, p.code AS participant_code \
             FROM attendance_logs l \
             JOIN event_registrations r ON r.id = l.registration_id \
             JOIN participants p ON p.id = r.participant_id \
             WHERE r.event_id = $1 \
             ORDER BY l.checked_at DESC, l.created_at DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(*event_id.as_uuid())
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let views = rows
            .into_iter()
            .map(|row| {
                Ok(LogEntryView {
                    entry: AttendanceLogEntry::try_from(row.entry)?,
                    participant_name: row.participant_name,
                    participant_code: row.participant_code,
                })
            })
            .collect::<Result<Vec<_>, GatewayError>>()?;

        Ok((views, to_u64(total)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_conversions_saturate() {
        assert_eq!(to_u64(-1), 0);
        assert_eq!(to_u64(42), 42);
        assert_eq!(to_i64(u64::MAX), i64::MAX);
    }

    #[test]
    fn non_database_errors_stay_persistence_errors() {
        let registration = Registration::issue(EventId::new(), ParticipantId::new());
        let err = registration_insert_error(&sqlx::Error::RowNotFound, &registration);
        assert!(matches!(err, GatewayError::PersistenceError(_)));
    }
}
