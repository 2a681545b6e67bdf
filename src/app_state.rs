//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::CheckInPolicy;
use crate::domain::{Clock, EventBus};
use crate::persistence::AttendanceStore;
use crate::service::{CheckInService, EventService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Check-in decision engine.
    pub check_in_service: Arc<CheckInService>,
    /// Organizer-side setup and reports.
    pub event_service: Arc<EventService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires the service layer over `store`.
    #[must_use]
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        clock: Arc<dyn Clock>,
        policy: CheckInPolicy,
        event_bus_capacity: usize,
    ) -> Self {
        let event_bus = EventBus::new(event_bus_capacity);
        let check_in_service = Arc::new(CheckInService::new(
            Arc::clone(&store),
            clock,
            event_bus.clone(),
            policy,
        ));
        let event_service = Arc::new(EventService::new(store));
        Self {
            check_in_service,
            event_service,
            event_bus,
        }
    }
}
