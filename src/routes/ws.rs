//! WebSocket handler — the relay loop.
//!
//! DESIGN
//! ======
//! On upgrade, runs admission (capacity, then credential) and enters a
//! `select!` loop:
//! - Incoming client frames → parse + dispatch by message type
//! - Broadcast events from room peers → forward to client
//! - Heartbeat ticks → ping, terminate if the previous ping went unanswered
//!
//! Dispatch order per mutating message is persist-then-broadcast: the shape
//! store assigns canonical ids, so nothing is fanned out until the store has
//! confirmed. A persistence failure produces an `error` reply to the sender
//! and no broadcast.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → capacity check (close 4002) → token check (close 4001)
//! 2. Client sends messages → validate → dispatch → broadcast via registry
//! 3. Close/error/heartbeat-timeout → drop from all rooms, release the slot

use std::sync::atomic::Ordering;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::protocol::{ClientMessage, ErrorReply, ServerEvent, Shape, parse_client_message};
use crate::services::room::ConnId;
use crate::services::shape::NewShape;
use crate::state::AppState;

/// Close code sent when the credential is missing, invalid, or expired.
pub const CLOSE_INVALID_TOKEN: u16 = 4001;
/// Close code sent when the relay is at its connection ceiling.
pub const CLOSE_AT_CAPACITY: u16 = 4002;

/// Outbound event channel depth per connection.
const EVENT_BUFFER: usize = 256;

// =============================================================================
// UPGRADE + ADMISSION
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let token = params.get("token").cloned().unwrap_or_default();
    ws.on_upgrade(move |socket| run_ws(socket, state, token))
}

/// Admission and the connection loop. Checks run post-upgrade so refusals
/// arrive as distinct close frames rather than failed handshakes.
async fn run_ws(mut socket: WebSocket, state: AppState, token: String) {
    // Capacity first: reserve a slot, give it back if over the ceiling.
    let previous = state.live_connections.fetch_add(1, Ordering::SeqCst);
    if previous >= state.limits.max_connections {
        state.live_connections.fetch_sub(1, Ordering::SeqCst);
        warn!(live = previous, "ws: refused connection at capacity");
        close_with(&mut socket, CLOSE_AT_CAPACITY, "at capacity").await;
        return;
    }

    let Some(user_id) = state.verifier.verify(&token) else {
        state.live_connections.fetch_sub(1, Ordering::SeqCst);
        warn!("ws: refused connection with invalid token");
        close_with(&mut socket, CLOSE_INVALID_TOKEN, "invalid token").await;
        return;
    };

    let conn_id: ConnId = Uuid::new_v4();
    info!(%conn_id, user_id, "ws: client connected");

    run_session(&mut socket, &state, conn_id, user_id).await;

    // Cleanup runs on every exit path: close, socket error, heartbeat timeout.
    state.rooms.drop_connection(conn_id).await;
    state.live_connections.fetch_sub(1, Ordering::SeqCst);
    info!(%conn_id, "ws: client disconnected");
}

// =============================================================================
// CONNECTION LOOP
// =============================================================================

async fn run_session(socket: &mut WebSocket, state: &AppState, conn_id: ConnId, user_id: i64) {
    // Per-connection channel for events fanned out by room peers.
    let (client_tx, mut client_rx) = mpsc::channel::<ServerEvent>(EVENT_BUFFER);

    let mut heartbeat = tokio::time::interval(state.limits.heartbeat);
    heartbeat.tick().await; // the first tick completes immediately
    let mut is_alive = true;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        if let Some(reply) = process_message(state, conn_id, user_id, &client_tx, &text).await
                            && send_json(socket, &reply).await.is_err()
                        {
                            break;
                        }
                    }
                    Message::Pong(_) => is_alive = true,
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = client_rx.recv() => {
                if send_json(socket, &event).await.is_err() {
                    break;
                }
            }
            _ = heartbeat.tick() => {
                if !is_alive {
                    warn!(%conn_id, "ws: heartbeat missed, terminating");
                    break;
                }
                is_alive = false;
                if socket.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }
}

// =============================================================================
// MESSAGE DISPATCH
// =============================================================================

/// Validate and dispatch one inbound text frame. Returns the error reply due
/// to the sender, if any; successful mutations answer through the room
/// broadcast instead. Separated from the socket so tests can drive dispatch
/// directly.
async fn process_message(
    state: &AppState,
    conn_id: ConnId,
    user_id: i64,
    client_tx: &mpsc::Sender<ServerEvent>,
    text: &str,
) -> Option<ErrorReply> {
    let msg = match parse_client_message(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(%conn_id, error = %e, "ws: rejected inbound message");
            return Some(ErrorReply::new(e.to_string()));
        }
    };

    match msg {
        ClientMessage::JoinRoom(join) => {
            state.rooms.join(join.room_id, conn_id, user_id, client_tx.clone()).await;
            None
        }
        ClientMessage::LeaveRoom(leave) => {
            state.rooms.leave(leave.room_id, conn_id).await;
            None
        }
        ClientMessage::Shape(submit) => {
            let new_shape = NewShape {
                room_id: submit.room_id,
                kind: submit.kind,
                geometry: submit.geometry.clone(),
                stroke_color: submit.stroke_color.clone(),
                stroke_width: submit.stroke_width,
                background_color: submit.background_color.clone(),
                owner_user_id: user_id,
            };
            let id = match state.gateway.create(new_shape).await {
                Ok(id) => id,
                Err(e) => {
                    error!(%conn_id, error = %e, "ws: shape create failed");
                    return Some(ErrorReply::new("failed to save shape"));
                }
            };
            // Everyone gets the confirmed shape, the sender included: the
            // echoed tempId is how the sender reconciles its optimistic copy.
            let event = ServerEvent::Shape(Shape {
                id: Some(id),
                temp_id: Some(submit.temp_id),
                kind: submit.kind,
                geometry: submit.geometry,
                stroke_color: submit.stroke_color,
                stroke_width: submit.stroke_width,
                background_color: submit.background_color,
                room_id: submit.room_id,
                owner_user_id: user_id,
            });
            state.rooms.broadcast(submit.room_id, &event, None).await;
            None
        }
        ClientMessage::Undo(undo) => {
            if let Err(e) = state.gateway.delete(undo.id).await {
                error!(%conn_id, id = undo.id, error = %e, "ws: shape delete failed");
                return Some(ErrorReply::new("failed to delete shape"));
            }
            // The sender already removed its copy locally.
            let event = ServerEvent::Undo(crate::protocol::UndoEvent {
                room_id: undo.room_id,
                id: undo.id,
            });
            state.rooms.broadcast(undo.room_id, &event, Some(conn_id)).await;
            None
        }
        ClientMessage::Redo(redo) => {
            // A redo is a fresh create; any id on the inbound shape is stale.
            let shape = redo.shape;
            let new_shape = NewShape {
                room_id: redo.room_id,
                kind: shape.kind,
                geometry: shape.geometry.clone(),
                stroke_color: shape.stroke_color.clone(),
                stroke_width: shape.stroke_width,
                background_color: shape.background_color.clone(),
                owner_user_id: user_id,
            };
            let id = match state.gateway.create(new_shape).await {
                Ok(id) => id,
                Err(e) => {
                    error!(%conn_id, error = %e, "ws: redo create failed");
                    return Some(ErrorReply::new("failed to save shape"));
                }
            };
            let event = ServerEvent::Shape(Shape {
                id: Some(id),
                temp_id: shape.temp_id,
                kind: shape.kind,
                geometry: shape.geometry,
                stroke_color: shape.stroke_color,
                stroke_width: shape.stroke_width,
                background_color: shape.background_color,
                room_id: redo.room_id,
                owner_user_id: user_id,
            });
            state.rooms.broadcast(redo.room_id, &event, None).await;
            None
        }
        ClientMessage::Update(update) => {
            let record = match state.gateway.update(update.id, &update.geometry).await {
                Ok(record) => record,
                Err(e) => {
                    error!(%conn_id, id = update.id, error = %e, "ws: shape update failed");
                    return Some(ErrorReply::new("failed to update shape"));
                }
            };
            let event = ServerEvent::Update(crate::protocol::UpdateEvent {
                id: record.id,
                geometry: record.geometry,
                room_id: update.room_id,
            });
            state.rooms.broadcast(update.room_id, &event, Some(conn_id)).await;
            None
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = match serde_json::to_string(value) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize outbound message");
            return Err(());
        }
    };
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

async fn close_with(socket: &mut WebSocket, code: u16, reason: &'static str) {
    let _ = socket
        .send(Message::Close(Some(CloseFrame { code, reason: reason.into() })))
        .await;
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
