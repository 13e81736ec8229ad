//! Server-side room bookkeeping.
//!
//! The registry pairs at most two connections per room and forwards frames
//! between them. It never looks inside a relayed payload.
//!
//! Locking: the registry map is taken first, then a single room. Relaying only
//! holds the map long enough to clone the room handle, so traffic in different
//! rooms does not serialize on one lock.

mod create;
mod join;
mod leave;
mod relay;

use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use crate::models::{ConnectionId, Room, RoomId, RoomSummary, WireMessage};

pub use create::MAX_CREATE_ATTEMPTS;

pub type SharedRoom = Arc<Mutex<Room>>;

#[derive(Default)]
struct RegistryInner {
    rooms: HashMap<RoomId, SharedRoom>,
    memberships: HashMap<ConnectionId, RoomId>,
}

#[derive(Clone, Default)]
pub struct RoomRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn room_count(&self) -> usize {
        self.inner.lock().await.rooms.len()
    }

    pub async fn contains(&self, room_id: &RoomId) -> bool {
        self.inner.lock().await.rooms.contains_key(room_id)
    }

    pub async fn room_of(&self, connection_id: ConnectionId) -> Option<RoomId> {
        self.inner
            .lock()
            .await
            .memberships
            .get(&connection_id)
            .cloned()
    }

    pub async fn room_summary(&self, room_id: &RoomId) -> Option<RoomSummary> {
        let room = self.inner.lock().await.rooms.get(room_id).cloned()?;
        let guard = room.lock().await;
        Some(guard.summary())
    }
}

/// Serializes a relay-originated frame. Failures are logged and yield `None`.
pub(crate) fn encode(msg: &WireMessage) -> Option<String> {
    match msg.to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to serialize {} message: {}", msg.kind(), e);
            None
        }
    }
}
