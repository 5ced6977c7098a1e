use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use roomwire_core::error::{RelayError, Result};
use roomwire_core::Identity;

use crate::relay::core::room::{Admission, Connection, JoinReport, LeaveReport, Room};
use crate::relay::core::{Outbox, WatchHub};
use crate::relay::types::ConnId;

/// Room registry: `room_id -> Room`.
///
/// A room is present iff it has at least one member (modulo the instant
/// between a join creating it and the join completing). Lock order is always
/// room lock, then map shard; never the reverse.
pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Room>>,
    watchers: WatchHub,
    conn_seq: AtomicU64,
    members: AtomicUsize,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            watchers: WatchHub::new(),
            conn_seq: AtomicU64::new(1),
            members: AtomicUsize::new(0),
        }
    }

    pub fn next_conn_id(&self) -> ConnId {
        ConnId(self.conn_seq.fetch_add(1, Ordering::Relaxed))
    }

    /// Existing room, or a freshly registered empty one.
    pub fn get_or_create(&self, room_id: &str) -> Arc<Room> {
        if let Some(room) = self.rooms.get(room_id) {
            return Arc::clone(room.value());
        }
        Arc::clone(
            self.rooms
                .entry(room_id.to_owned())
                .or_insert_with(|| Arc::new(Room::new(room_id)))
                .value(),
        )
    }

    pub fn get(&self, room_id: &str) -> Option<Arc<Room>> {
        self.rooms.get(room_id).map(|r| Arc::clone(r.value()))
    }

    /// Drop `room_id` from the registry if its membership is empty.
    ///
    /// Serialized against joins through the room lock: a join that gets the
    /// lock first keeps the room alive, a join that gets it later sees the
    /// room retired and creates a fresh one.
    pub async fn remove_if_empty(&self, room_id: &str) -> bool {
        let Some(room) = self.get(room_id) else {
            return false;
        };
        let removed = room
            .retire_if_empty(|| {
                self.rooms.remove_if(room_id, |_, r| Arc::ptr_eq(r, &room));
            })
            .await;
        if removed {
            tracing::debug!(room = %room_id, "room removed");
        }
        removed
    }

    /// Admit `identity` into `room_id`, announcing it and replaying the
    /// existing membership to `conn`.
    pub async fn join(
        &self,
        room_id: &str,
        identity: Identity,
        conn: Connection,
    ) -> Result<(Arc<Room>, JoinReport)> {
        loop {
            let room = self.get_or_create(room_id);
            match room.admit(identity.clone(), conn.clone(), &self.watchers).await? {
                Admission::Admitted(report) => {
                    self.members.fetch_add(1, Ordering::Relaxed);
                    return Ok((room, report));
                }
                Admission::Taken => return Err(RelayError::IdentityTaken(identity.to_string())),
                // lost a race with the last leave; retry against the fresh entry
                Admission::Retired => continue,
            }
        }
    }

    /// Remove `conn` from `room`, announce the departure, and garbage-collect
    /// the room if it is now empty. `None` if `conn` was not a member.
    pub async fn leave(&self, room: &Room, conn: ConnId) -> Option<LeaveReport> {
        let report = room.depart(conn, &self.watchers).await?;
        self.members.fetch_sub(1, Ordering::Relaxed);
        if report.remaining == 0 {
            self.remove_if_empty(room.id()).await;
        }
        Some(report)
    }

    pub fn watchers(&self) -> &WatchHub {
        &self.watchers
    }

    /// Start watching `room_id` and send its current occupancy if it exists.
    ///
    /// Registration happens before the snapshot, so a join or leave racing
    /// with this call is reported either in the snapshot or after it.
    pub async fn watch(&self, room_id: &str, conn: ConnId, outbox: &Arc<Outbox>) {
        self.watchers.watch(room_id, conn, outbox);
        if let Some(room) = self.get(room_id) {
            room.report_to(outbox).await;
        }
    }

    pub fn unwatch(&self, room_id: &str, conn: ConnId) {
        self.watchers.unwatch(room_id, conn);
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.load(Ordering::Relaxed)
    }

    pub fn room_ids(&self) -> Vec<String> {
        self.rooms.iter().map(|r| r.key().clone()).collect()
    }
}
