//! Check-in orchestration.
//!
//! [`CheckInService::check_in`] is the single public operation of the
//! decision engine: resolve → scope → classify → record → respond. Steps
//! before recording are reads and pure computation, so a call abandoned
//! before the store commits leaves no trace.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::recorder::AttendanceRecorder;
use super::resolver::{TokenResolver, normalize_token};
use super::scope_guard::ensure_scope;
use crate::config::{CheckInPolicy, ScanClock};
use crate::domain::{
    AttendanceEvent, CheckInRejection, Classification, Clock, EventBus, EventId, HandlerId,
    RegistrationId, ScanMetadata,
};
use crate::error::GatewayError;
use crate::persistence::AttendanceStore;

/// One scan as presented by a checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CheckInCommand {
    /// Raw scanned or typed token.
    pub token: String,
    /// Event the checkpoint is scoped to; `None` for the general checkpoint.
    pub expected_event_id: Option<EventId>,
    /// Free-text origin of the scan.
    pub device_label: Option<String>,
    /// Operator or device account resolved by the session layer.
    pub handler_id: Option<HandlerId>,
    /// Instant captured by the device. Only honored under
    /// [`ScanClock::Device`].
    pub scanned_at: Option<DateTime<Utc>>,
}

/// Outcome of a recorded check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInReceipt {
    /// Event the registration belongs to.
    pub event_id: EventId,
    /// Scanned registration.
    pub registration_id: RegistrationId,
    /// Event title.
    pub event_title: String,
    /// Participant display name.
    pub participant_name: String,
    /// Participant external code.
    pub participant_code: Option<String>,
    /// Timing classification.
    pub classification: Classification,
    /// Scan instant.
    pub checked_at: DateTime<Utc>,
    /// Whether this scan marked first attendance.
    pub is_first: bool,
}

/// Check-in decision engine.
///
/// Stateless coordinator: owns the resolver and recorder over a shared
/// [`AttendanceStore`], the clock, and the [`EventBus`] for live updates.
#[derive(Debug, Clone)]
pub struct CheckInService {
    resolver: TokenResolver,
    recorder: AttendanceRecorder,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    policy: CheckInPolicy,
}

impl CheckInService {
    /// Creates a new `CheckInService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
        policy: CheckInPolicy,
    ) -> Self {
        Self {
            resolver: TokenResolver::new(Arc::clone(&store)),
            recorder: AttendanceRecorder::new(store),
            clock,
            event_bus,
            policy,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Decides and records one scan.
    ///
    /// `invalid` timing is a successful call: the scan is logged but never
    /// marks attendance.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidRequest`] for an empty token.
    /// - [`GatewayError::CheckInRejected`] with
    ///   [`CheckInRejection::NotFound`] or [`CheckInRejection::WrongEvent`];
    ///   no attendance is recorded in either case.
    /// - [`GatewayError::PersistenceError`] on storage failure.
    pub async fn check_in(&self, command: CheckInCommand) -> Result<CheckInReceipt, GatewayError> {
        let token = normalize_token(&command.token)?;
        let checked_at = self.scan_instant(command.scanned_at);
        let metadata = ScanMetadata {
            device_label: command
                .device_label
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            handled_by: command.handler_id,
        };

        let resolved = match self.resolver.resolve(token).await {
            Ok(resolved) => resolved,
            Err(GatewayError::CheckInRejected(rejection)) => {
                return Err(self.reject(rejection, command.expected_event_id, checked_at));
            }
            Err(other) => return Err(other),
        };
        let registration_id = resolved.registration.id;
        let classification = resolved.event.classify(checked_at);

        if let Err(rejection) = ensure_scope(resolved.event.id, command.expected_event_id) {
            if self.policy.audit_wrong_event
                && let CheckInRejection::WrongEvent { expected, .. } = rejection
                && let Err(err) = self
                    .recorder
                    .audit_wrong_event(
                        registration_id,
                        expected,
                        classification,
                        checked_at,
                        metadata,
                    )
                    .await
            {
                tracing::warn!(%registration_id, error = %err, "failed to audit wrong-event scan");
            }
            return Err(self.reject(rejection, command.expected_event_id, checked_at));
        }

        let recorded = self
            .recorder
            .record(registration_id, classification, checked_at, metadata)
            .await?;

        let receipt = CheckInReceipt {
            event_id: resolved.event.id,
            registration_id,
            event_title: resolved.event.title,
            participant_name: resolved.participant.name,
            participant_code: resolved.participant.code,
            classification,
            checked_at,
            is_first: recorded.is_first,
        };

        let _ = self.event_bus.publish(AttendanceEvent::ScanRecorded {
            event_id: receipt.event_id,
            registration_id,
            participant_name: receipt.participant_name.clone(),
            classification,
            is_first: receipt.is_first,
            checked_at,
        });

        Ok(receipt)
    }

    fn scan_instant(&self, device_instant: Option<DateTime<Utc>>) -> DateTime<Utc> {
        match (self.policy.scan_clock, device_instant) {
            (ScanClock::Device, Some(instant)) => instant,
            _ => self.clock.now(),
        }
    }

    fn reject(
        &self,
        rejection: CheckInRejection,
        expected: Option<EventId>,
        timestamp: DateTime<Utc>,
    ) -> GatewayError {
        tracing::info!(
            code = rejection.code().as_str(),
            expected_event_id = ?expected,
            "scan rejected"
        );
        let _ = self.event_bus.publish(AttendanceEvent::ScanRejected {
            expected_event_id: expected,
            code: rejection.code(),
            timestamp,
        });
        GatewayError::CheckInRejected(rejection)
    }
}
