//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams check-in outcomes to dashboards
//! that subscribe to one or more events (or `"*"` for all of them).

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
