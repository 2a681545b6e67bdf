//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching subscription commands and forwarding filtered check-in
//! notifications.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{AttendanceEvent, EventId};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<AttendanceEvent>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(attendance_event) => {
                        if subs.matches(attendance_event.event_id()) {
                            let Some(json) = render_event(&attendance_event) else {
                                continue;
                            };
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

fn render_event(event: &AttendanceEvent) -> Option<String> {
    let payload = serde_json::to_value(event).ok()?;
    let msg = WsMessage::new(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload);
    serde_json::to_string(&msg).ok()
}

fn error_message(id: String, code: u16, message: &str) -> Option<String> {
    let err = WsMessage::new(
        id,
        WsMessageType::Error,
        serde_json::json!({ "code": code, "message": message }),
    );
    serde_json::to_string(&err).ok()
}

/// Splits raw subscription targets into parsed event IDs and the wildcard
/// flag. Entries that are neither `"*"` nor a UUID are skipped.
fn parse_targets(raw: &[String]) -> (Vec<EventId>, bool) {
    let mut ids = Vec::new();
    let mut wildcard = false;
    for value in raw {
        if value == "*" {
            wildcard = true;
        } else if let Ok(uuid) = value.parse::<uuid::Uuid>() {
            ids.push(EventId::from_uuid(uuid));
        }
    }
    (ids, wildcard)
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return error_message(String::new(), 400, "malformed JSON");
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return error_message(msg.id, 404, "unknown command");
    };

    let payload = match command {
        WsCommand::Subscribe { event_ids } => {
            let (ids, wildcard) = parse_targets(&event_ids);
            subs.subscribe(&ids, wildcard);
            serde_json::json!({
                "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::Unsubscribe { event_ids } => {
            let (ids, _) = parse_targets(&event_ids);
            subs.unsubscribe(&ids);
            serde_json::json!({
                "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "remaining_count": subs.count(),
            })
        }
    };

    let response = WsMessage::new(msg.id, WsMessageType::Response, payload);
    serde_json::to_string(&response).ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn parse(json: &str) -> WsMessage {
        let Ok(msg) = serde_json::from_str::<WsMessage>(json) else {
            panic!("response should be a valid envelope: {json}");
        };
        msg
    }

    #[test]
    fn subscribe_wildcard_enables_all() {
        let mut subs = SubscriptionManager::new();
        let request = r#"{"id":"1","type":"command","timestamp":"2026-03-01T09:00:00Z","payload":{"command":"subscribe","event_ids":["*"]}}"#;
        let Some(response) = handle_text_message(request, &mut subs) else {
            panic!("expected a response");
        };
        let msg = parse(&response);
        assert_eq!(msg.msg_type, WsMessageType::Response);
        assert_eq!(msg.id, "1");
        assert!(subs.is_subscribed_all());
    }

    #[test]
    fn subscribe_then_unsubscribe_event() {
        let mut subs = SubscriptionManager::new();
        let id = EventId::new();
        let subscribe = format!(
            r#"{{"id":"a","type":"command","timestamp":"2026-03-01T09:00:00Z","payload":{{"command":"subscribe","event_ids":["{id}","garbage"]}}}}"#
        );
        let _ = handle_text_message(&subscribe, &mut subs);
        assert!(subs.matches(Some(id)));
        assert_eq!(subs.count(), 1);

        let unsubscribe = format!(
            r#"{{"id":"b","type":"command","timestamp":"2026-03-01T09:00:00Z","payload":{{"command":"unsubscribe","event_ids":["{id}"]}}}}"#
        );
        let _ = handle_text_message(&unsubscribe, &mut subs);
        assert!(!subs.matches(Some(id)));
    }

    #[test]
    fn malformed_json_yields_error() {
        let mut subs = SubscriptionManager::new();
        let Some(response) = handle_text_message("not json", &mut subs) else {
            panic!("expected a response");
        };
        assert_eq!(parse(&response).msg_type, WsMessageType::Error);
    }

    #[test]
    fn unknown_command_yields_error() {
        let mut subs = SubscriptionManager::new();
        let request = r#"{"id":"x","type":"command","timestamp":"2026-03-01T09:00:00Z","payload":{"command":"explode"}}"#;
        let Some(response) = handle_text_message(request, &mut subs) else {
            panic!("expected a response");
        };
        let msg = parse(&response);
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.id, "x");
    }
}
