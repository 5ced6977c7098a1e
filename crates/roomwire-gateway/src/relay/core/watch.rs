use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use roomwire_core::RoomInfo;

use crate::relay::core::Outbox;
use crate::relay::types::{ConnId, Delivery, PreparedFrame};

/// Watchers per room id.
///
/// Rooms call [`WatchHub::notify`] while holding their own lock, so updates
/// for one room reach each watcher in membership order. The hub itself only
/// takes short, non-awaiting shard locks.
#[derive(Default)]
pub struct WatchHub {
    rooms: DashMap<String, HashMap<ConnId, Arc<Outbox>>>,
}

impl WatchHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&self, room_id: &str, conn: ConnId, outbox: &Arc<Outbox>) {
        self.rooms
            .entry(room_id.to_owned())
            .or_insert_with(HashMap::new)
            .insert(conn, Arc::clone(outbox));
    }

    pub fn unwatch(&self, room_id: &str, conn: ConnId) {
        let now_empty = match self.rooms.get_mut(room_id) {
            Some(mut watchers) => {
                watchers.remove(&conn);
                watchers.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.rooms.remove_if(room_id, |_, w| w.is_empty());
        }
    }

    /// Push the current occupancy of `room_id` to all of its watchers.
    pub(crate) fn notify(&self, room_id: &str, user_count: usize) -> Delivery {
        let mut delivery = Delivery::default();
        let Some(watchers) = self.rooms.get(room_id) else {
            return delivery;
        };
        match PreparedFrame::room_info(&RoomInfo::new(room_id, user_count)) {
            Ok(frame) => {
                for outbox in watchers.values() {
                    delivery.record(outbox.push(frame.clone()));
                }
            }
            Err(e) => tracing::error!(room = %room_id, error = %e, "room info not encodable"),
        }
        delivery
    }

    pub fn watcher_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map(|w| w.len()).unwrap_or(0)
    }

    /// Distinct room ids with at least one watcher.
    pub fn watched_rooms(&self) -> usize {
        self.rooms.len()
    }
}
