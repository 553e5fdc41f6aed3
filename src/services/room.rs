//! Room registry — membership and fan-out.
//!
//! DESIGN
//! ======
//! Rooms are an in-memory concern of the relay process: created when the
//! first member joins, destroyed when the last member leaves, never
//! persisted. The [`RoomRegistry`] trait keeps the relay's per-message logic
//! independent of where delivery happens, so the in-process map
//! implementation here could be swapped for one backed by a shared pub/sub
//! backbone without touching the handlers.
//!
//! Fan-out is best-effort: a member whose outbound channel is full misses
//! that event rather than stalling the room.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};
use tracing::info;
use uuid::Uuid;

use crate::protocol::ServerEvent;

/// Process-unique identifier for one websocket connection.
pub type ConnId = Uuid;

/// One member of a room: who they are and how to reach them.
#[derive(Debug, Clone)]
pub struct Member {
    pub user_id: i64,
    pub tx: mpsc::Sender<ServerEvent>,
}

/// A live collaboration session. Exists only while it has members.
#[derive(Debug, Default)]
struct Room {
    members: HashMap<ConnId, Member>,
}

/// Membership-and-broadcast boundary consumed by the relay handlers.
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Add a connection to a room, creating the room on first join.
    async fn join(&self, room_id: i64, conn_id: ConnId, user_id: i64, tx: mpsc::Sender<ServerEvent>);

    /// Remove a connection from one room.
    async fn leave(&self, room_id: i64, conn_id: ConnId);

    /// Remove a closed connection from every room it was a member of.
    async fn drop_connection(&self, conn_id: ConnId);

    /// Deliver an event to every member of a room, optionally excluding one
    /// connection (the sender).
    async fn broadcast(&self, room_id: i64, event: &ServerEvent, exclude: Option<ConnId>);

    /// Current member count; zero for rooms that don't exist.
    async fn member_count(&self, room_id: i64) -> usize;
}

/// The single-process implementation: a guarded map of room id to members.
#[derive(Default)]
pub struct InProcessRegistry {
    rooms: RwLock<HashMap<i64, Room>>,
}

impl InProcessRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRegistry for InProcessRegistry {
    async fn join(&self, room_id: i64, conn_id: ConnId, user_id: i64, tx: mpsc::Sender<ServerEvent>) {
        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(room_id).or_default();
        room.members.insert(conn_id, Member { user_id, tx });
        info!(%room_id, %conn_id, user_id, members = room.members.len(), "joined room");
    }

    async fn leave(&self, room_id: i64, conn_id: ConnId) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(&room_id) else {
            return;
        };
        if room.members.remove(&conn_id).is_some() {
            info!(%room_id, %conn_id, remaining = room.members.len(), "left room");
        }
        if room.members.is_empty() {
            rooms.remove(&room_id);
            info!(%room_id, "room destroyed");
        }
    }

    async fn drop_connection(&self, conn_id: ConnId) {
        let mut rooms = self.rooms.write().await;
        let mut emptied = Vec::new();
        for (room_id, room) in rooms.iter_mut() {
            if room.members.remove(&conn_id).is_some() {
                info!(room_id = %room_id, %conn_id, "removed closed connection from room");
                if room.members.is_empty() {
                    emptied.push(*room_id);
                }
            }
        }
        for room_id in emptied {
            rooms.remove(&room_id);
            info!(%room_id, "room destroyed");
        }
    }

    async fn broadcast(&self, room_id: i64, event: &ServerEvent, exclude: Option<ConnId>) {
        let rooms = self.rooms.read().await;
        let Some(room) = rooms.get(&room_id) else {
            return;
        };
        for (conn_id, member) in &room.members {
            if exclude == Some(*conn_id) {
                continue;
            }
            // Best-effort: a full channel drops the event for that member.
            let _ = member.tx.try_send(event.clone());
        }
    }

    async fn member_count(&self, room_id: i64) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(&room_id).map_or(0, |room| room.members.len())
    }
}
