//! # attendance-gateway
//!
//! REST API and WebSocket gateway for QR-code event check-in.
//!
//! A checkpoint scans a participant's QR code and submits the opaque token.
//! The gateway resolves the token to its registration, optionally verifies
//! that it belongs to the event being staffed, classifies the scan against
//! the event's time window, appends an entry to the attendance log and
//! records the first successful attendance exactly once.
//!
//! ## Architecture
//!
//! ```text
//! Checkpoints / dashboards (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── CheckInService, EventService (service/)
//!     ├── EventBus, time-window classifier (domain/)
//!     │
//!     └── AttendanceStore (persistence/)
//!             ├── MemoryStore
//!             └── PostgresStore
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
