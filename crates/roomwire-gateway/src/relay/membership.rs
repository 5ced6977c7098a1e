//! Join/leave lifecycle of one initialized connection.

use std::sync::Arc;

use roomwire_core::error::Result;
use roomwire_core::Identity;

use crate::relay::core::{Connection, JoinReport, LeaveReport, Room, RoomRegistry};
use crate::relay::types::ConnId;

/// Proof that a connection is a member of a room under an identity.
///
/// Leaving happens exactly once: either through [`Membership::leave`] or,
/// if the owning worker is dropped first, from `Drop` on the runtime.
pub struct Membership {
    registry: Arc<RoomRegistry>,
    room: Arc<Room>,
    identity: Identity,
    conn: ConnId,
    active: bool,
}

impl Membership {
    /// Run the join handshake for an already validated identity.
    ///
    /// Fails with `IdentityTaken` if a live member of the room already holds
    /// `identity`; in that case nothing is announced to anyone.
    pub async fn establish(
        registry: Arc<RoomRegistry>,
        room_id: &str,
        identity: Identity,
        conn: Connection,
    ) -> Result<(Self, JoinReport)> {
        let conn_id = conn.id;
        let (room, report) = registry.join(room_id, identity.clone(), conn).await?;
        Ok((
            Self {
                registry,
                room,
                identity,
                conn: conn_id,
                active: true,
            },
            report,
        ))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn room(&self) -> &Arc<Room> {
        &self.room
    }

    pub fn conn_id(&self) -> ConnId {
        self.conn
    }

    /// Leave the room, announcing the departure to remaining members.
    ///
    /// Cancelling this future before it completes leaves the guard armed, so
    /// `Drop` still removes the member.
    pub async fn leave(mut self) -> Option<LeaveReport> {
        let report = self.registry.leave(&self.room, self.conn).await;
        self.active = false;
        report
    }
}

impl Drop for Membership {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let registry = Arc::clone(&self.registry);
        let room = Arc::clone(&self.room);
        let conn = self.conn;
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn(async move {
                    registry.leave(&room, conn).await;
                });
            }
            Err(_) => {
                tracing::warn!(room = %room.id(), %conn, "membership dropped outside runtime, leave skipped");
            }
        }
    }
}
