//! Room watch subscriptions.

use std::sync::Arc;

use crate::relay::core::{Outbox, RoomRegistry};
use crate::relay::types::ConnId;

/// The set of rooms one watch connection follows.
///
/// Dropping the subscription unregisters every room it watches.
pub struct WatchSubscription {
    registry: Arc<RoomRegistry>,
    conn: ConnId,
    outbox: Arc<Outbox>,
    rooms: Vec<String>,
}

impl WatchSubscription {
    pub fn new(registry: Arc<RoomRegistry>, conn: ConnId, outbox: Arc<Outbox>) -> Self {
        Self {
            registry,
            conn,
            outbox,
            rooms: Vec::new(),
        }
    }

    /// Replace the watched set with `rooms`.
    ///
    /// Every listed room that currently exists gets a fresh occupancy frame;
    /// rooms no longer listed stop producing updates.
    pub async fn replace(&mut self, rooms: Vec<String>) {
        for room in &rooms {
            self.registry.watch(room, self.conn, &self.outbox).await;
        }
        for old in self.rooms.iter().filter(|r| !rooms.contains(r)) {
            self.registry.unwatch(old, self.conn);
        }
        self.rooms = rooms;
    }

    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn conn_id(&self) -> ConnId {
        self.conn
    }
}

impl Drop for WatchSubscription {
    fn drop(&mut self) {
        for room in &self.rooms {
            self.registry.unwatch(room, self.conn);
        }
    }
}
