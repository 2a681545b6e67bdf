//! In-process attendance store.
//!
//! [`MemoryStore`] keeps every table in a single [`tokio::sync::RwLock`].
//! Recording a scan takes the write lock once and performs the log append
//! and the conditional first-attendance update with no await point in
//! between, which makes the step atomic and safe to cancel.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AttendanceStore, AttendanceSummary, ClassificationCounts, LogEntryView};
use crate::domain::{
    AttendanceLogEntry, Clock, Event, EventId, NewScan, Participant, ParticipantId, RecordedScan,
    Registration, RegistrationId, RegistrationStatus, ResolvedRegistration, SystemClock,
};
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    participants: HashMap<ParticipantId, Participant>,
    registrations: HashMap<RegistrationId, Registration>,
    /// `qr_token` → registration; enforces global token uniqueness.
    tokens: HashMap<String, RegistrationId>,
    log: Vec<AttendanceLogEntry>,
}

/// Attendance store held entirely in memory.
///
/// # Concurrency
///
/// - Lookups take the read lock and run concurrently.
/// - Every write takes the write lock, so `record_scan` calls on the same
///   registration are serialized and exactly one observes an unset
///   `first_checked_in_at`.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Creates an empty store stamping `created_at` with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store stamping `created_at` with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
        }
    }

    /// Returns every log entry for a registration in insertion order.
    pub async fn log_for(&self, registration_id: RegistrationId) -> Vec<AttendanceLogEntry> {
        let tables = self.tables.read().await;
        tables
            .log
            .iter()
            .filter(|e| e.registration_id == registration_id)
            .cloned()
            .collect()
    }

    /// Returns the total number of log entries.
    pub async fn log_len(&self) -> usize {
        self.tables.read().await.log.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_registration_by_token(
        &self,
        token: &str,
    ) -> Result<Option<ResolvedRegistration>, GatewayError> {
        let tables = self.tables.read().await;
        let Some(registration) = tables
            .tokens
            .get(token)
            .and_then(|id| tables.registrations.get(id))
        else {
            return Ok(None);
        };
        let event = tables
            .events
            .get(&registration.event_id)
            .ok_or(GatewayError::EventNotFound(*registration.event_id.as_uuid()))?;
        let participant = tables
            .participants
            .get(&registration.participant_id)
            .ok_or(GatewayError::ParticipantNotFound(
                *registration.participant_id.as_uuid(),
            ))?;
        Ok(Some(ResolvedRegistration {
            registration: registration.clone(),
            event: event.clone(),
            participant: participant.clone(),
        }))
    }

    async fn record_scan(&self, scan: NewScan) -> Result<RecordedScan, GatewayError> {
        let mut tables = self.tables.write().await;
        let created_at = self.clock.now();

        let registration = tables
            .registrations
            .get_mut(&scan.registration_id)
            .ok_or_else(|| {
                GatewayError::PersistenceError(format!(
                    "registration {} vanished before recording",
                    scan.registration_id
                ))
            })?;

        let is_first =
            scan.classification.counts_as_attendance() && registration.first_checked_in_at.is_none();
        if is_first {
            registration.first_checked_in_at = Some(scan.checked_at);
            registration.status = RegistrationStatus::Attended;
        }

        let entry = scan.into_entry(created_at);
        tables.log.push(entry.clone());
        Ok(RecordedScan { entry, is_first })
    }

    async fn append_audit_entry(&self, scan: NewScan) -> Result<AttendanceLogEntry, GatewayError> {
        let mut tables = self.tables.write().await;
        if !tables.registrations.contains_key(&scan.registration_id) {
            return Err(GatewayError::PersistenceError(format!(
                "registration {} does not exist",
                scan.registration_id
            )));
        }
        let entry = scan.into_entry(self.clock.now());
        tables.log.push(entry.clone());
        Ok(entry)
    }

    async fn insert_event(&self, event: &Event) -> Result<(), GatewayError> {
        let mut tables = self.tables.write().await;
        if tables.events.contains_key(&event.id) {
            return Err(GatewayError::PersistenceError(format!(
                "event {} already exists",
                event.id
            )));
        }
        tables.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>, GatewayError> {
        Ok(self.tables.read().await.events.get(&event_id).cloned())
    }

    async fn insert_participant(&self, participant: &Participant) -> Result<(), GatewayError> {
        let mut tables = self.tables.write().await;
        if tables.participants.contains_key(&participant.id) {
            return Err(GatewayError::PersistenceError(format!(
                "participant {} already exists",
                participant.id
            )));
        }
        tables.participants.insert(participant.id, participant.clone());
        Ok(())
    }

    async fn find_participant(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<Participant>, GatewayError> {
        Ok(self
            .tables
            .read()
            .await
            .participants
            .get(&participant_id)
            .cloned())
    }

    async fn insert_registration(&self, registration: &Registration) -> Result<(), GatewayError> {
        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(&registration.event_id) {
            return Err(GatewayError::EventNotFound(*registration.event_id.as_uuid()));
        }
        if !tables.participants.contains_key(&registration.participant_id) {
            return Err(GatewayError::ParticipantNotFound(
                *registration.participant_id.as_uuid(),
            ));
        }
        let duplicate = tables.registrations.values().any(|r| {
            r.event_id == registration.event_id && r.participant_id == registration.participant_id
        });
        if duplicate {
            return Err(GatewayError::AlreadyRegistered {
                event_id: *registration.event_id.as_uuid(),
                participant_id: *registration.participant_id.as_uuid(),
            });
        }
        if tables.tokens.contains_key(&registration.qr_token) {
            return Err(GatewayError::PersistenceError(
                "scan token collision".to_string(),
            ));
        }
        tables
            .tokens
            .insert(registration.qr_token.clone(), registration.id);
        tables
            .registrations
            .insert(registration.id, registration.clone());
        Ok(())
    }

    async fn find_registration(
        &self,
        registration_id: RegistrationId,
    ) -> Result<Option<Registration>, GatewayError> {
        Ok(self
            .tables
            .read()
            .await
            .registrations
            .get(&registration_id)
            .cloned())
    }

    async fn attendance_summary(
        &self,
        event_id: EventId,
    ) -> Result<AttendanceSummary, GatewayError> {
        let tables = self.tables.read().await;
        let mut summary = AttendanceSummary::default();
        for registration in tables.registrations.values() {
            if registration.event_id != event_id {
                continue;
            }
            summary.registered += 1;
            if registration.first_checked_in_at.is_some() {
                summary.attended += 1;
            }
        }
        let mut scans = ClassificationCounts::default();
        for entry in &tables.log {
            let belongs = tables
                .registrations
                .get(&entry.registration_id)
                .is_some_and(|r| r.event_id == event_id);
            if !belongs {
                continue;
            }
            if entry.is_rejected() {
                summary.rejected_scans += 1;
            } else {
                scans.add(entry.classification, 1);
            }
        }
        summary.scans = scans;
        Ok(summary)
    }

    async fn list_log_entries(
        &self,
        event_id: EventId,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<LogEntryView>, u64), GatewayError> {
        let tables = self.tables.read().await;
        let mut views: Vec<LogEntryView> = tables
            .log
            .iter()
            .filter_map(|entry| {
                let registration = tables.registrations.get(&entry.registration_id)?;
                if registration.event_id != event_id {
                    return None;
                }
                let participant = tables.participants.get(&registration.participant_id)?;
                Some(LogEntryView {
                    entry: entry.clone(),
                    participant_name: participant.name.clone(),
                    participant_code: participant.code.clone(),
                })
            })
            .collect();
        // Newest first; ties keep reverse insertion order.
        views.reverse();
        views.sort_by(|a, b| b.entry.checked_at.cmp(&a.entry.checked_at));

        let total = u64::try_from(views.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let page = views.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Classification, RejectionCode, ScanMetadata};
    use chrono::{DateTime, Duration, Utc};

    async fn seeded() -> (MemoryStore, Event, Registration) {
        let store = MemoryStore::new();
        let start = Utc::now();
        let Ok(event) = Event::new(
            "Workshop",
            start.date_naive(),
            start,
            start + Duration::hours(1),
            10,
            uuid::Uuid::new_v4(),
        ) else {
            panic!("valid event");
        };
        let Ok(participant) = Participant::new("Ada", Some("S-1"), None) else {
            panic!("valid participant");
        };
        let registration = Registration::issue(event.id, participant.id);
        assert!(store.insert_event(&event).await.is_ok());
        assert!(store.insert_participant(&participant).await.is_ok());
        assert!(store.insert_registration(&registration).await.is_ok());
        (store, event, registration)
    }

    fn scan(id: RegistrationId, at: DateTime<Utc>, classification: Classification) -> NewScan {
        NewScan {
            registration_id: id,
            checked_at: at,
            classification,
            metadata: ScanMetadata::default(),
            rejection: None,
            checkpoint_event_id: None,
        }
    }

    #[tokio::test]
    async fn token_lookup_is_exact() {
        let (store, event, registration) = seeded().await;
        let Ok(Some(found)) = store.find_registration_by_token(&registration.qr_token).await
        else {
            panic!("token should resolve");
        };
        assert_eq!(found.event.id, event.id);
        assert_eq!(found.participant.name, "Ada");

        let upper = registration.qr_token.to_uppercase();
        assert!(matches!(
            store.find_registration_by_token(&upper).await,
            Ok(None)
        ));
    }

    #[tokio::test]
    async fn first_scan_marks_attendance_once() {
        let (store, _, registration) = seeded().await;
        let t1 = Utc::now();
        let t2 = t1 + Duration::minutes(5);

        let Ok(first) = store
            .record_scan(scan(registration.id, t1, Classification::OnTime))
            .await
        else {
            panic!("record failed");
        };
        let Ok(second) = store
            .record_scan(scan(registration.id, t2, Classification::Late))
            .await
        else {
            panic!("record failed");
        };
        assert!(first.is_first);
        assert!(!second.is_first);

        let Ok(Some(stored)) = store.find_registration(registration.id).await else {
            panic!("registration missing");
        };
        assert_eq!(stored.first_checked_in_at, Some(t1));
        assert_eq!(stored.status, RegistrationStatus::Attended);
        assert_eq!(store.log_len().await, 2);
    }

    #[tokio::test]
    async fn invalid_scan_is_logged_without_attendance() {
        let (store, _, registration) = seeded().await;
        let Ok(recorded) = store
            .record_scan(scan(registration.id, Utc::now(), Classification::Invalid))
            .await
        else {
            panic!("record failed");
        };
        assert!(!recorded.is_first);

        let Ok(Some(stored)) = store.find_registration(registration.id).await else {
            panic!("registration missing");
        };
        assert_eq!(stored.status, RegistrationStatus::Registered);
        assert!(stored.first_checked_in_at.is_none());
        assert_eq!(store.log_for(registration.id).await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_registration_rejected() {
        let (store, event, registration) = seeded().await;
        let again = Registration::issue(event.id, registration.participant_id);
        assert!(matches!(
            store.insert_registration(&again).await,
            Err(GatewayError::AlreadyRegistered { .. })
        ));
    }

    #[tokio::test]
    async fn summary_counts_by_classification() {
        let (store, event, registration) = seeded().await;
        let now = Utc::now();
        let _ = store
            .record_scan(scan(registration.id, now, Classification::TooEarly))
            .await;
        let _ = store
            .record_scan(scan(registration.id, now, Classification::Late))
            .await;
        let _ = store
            .record_scan(scan(registration.id, now, Classification::Invalid))
            .await;

        let Ok(summary) = store.attendance_summary(event.id).await else {
            panic!("summary failed");
        };
        assert_eq!(summary.registered, 1);
        assert_eq!(summary.attended, 1);
        assert_eq!(summary.scans.too_early, 1);
        assert_eq!(summary.scans.late, 1);
        assert_eq!(summary.scans.invalid, 1);
        assert_eq!(summary.scans.total(), 3);
    }

    #[tokio::test]
    async fn audited_rejections_stay_out_of_classification_counts() {
        let (store, event, registration) = seeded().await;
        let checkpoint = EventId::new();
        let audited = NewScan {
            rejection: Some(RejectionCode::WrongEvent),
            checkpoint_event_id: Some(checkpoint),
            ..scan(registration.id, Utc::now(), Classification::OnTime)
        };
        let Ok(entry) = store.append_audit_entry(audited).await else {
            panic!("audit append failed");
        };
        assert!(entry.is_rejected());
        assert_eq!(entry.checkpoint_event_id, Some(checkpoint));

        let Ok(summary) = store.attendance_summary(event.id).await else {
            panic!("summary failed");
        };
        assert_eq!(summary.scans.total(), 0);
        assert_eq!(summary.rejected_scans, 1);
        assert_eq!(summary.attended, 0);

        let Ok((page, total)) = store.list_log_entries(event.id, 0, 10).await else {
            panic!("list failed");
        };
        assert_eq!(total, 1);
        assert!(page.iter().all(|v| v.entry.rejection == Some(RejectionCode::WrongEvent)));
    }

    #[tokio::test]
    async fn log_pages_newest_first() {
        let (store, event, registration) = seeded().await;
        let t0 = Utc::now();
        for i in 0..5 {
            let _ = store
                .record_scan(scan(
                    registration.id,
                    t0 + Duration::minutes(i),
                    Classification::OnTime,
                ))
                .await;
        }
        let Ok((page, total)) = store.list_log_entries(event.id, 1, 2).await else {
            panic!("list failed");
        };
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        let times: Vec<_> = page.iter().map(|v| v.entry.checked_at).collect();
        assert_eq!(times, vec![t0 + Duration::minutes(3), t0 + Duration::minutes(2)]);
        assert!(page.iter().all(|v| v.participant_name == "Ada"));
    }
}
