use std::sync::Arc;

use tokio::sync::Mutex;

use roomwire_core::error::Result;
use roomwire_core::{Identity, RoomInfo, ServerEnvelope};

use crate::relay::core::{Outbox, WatchHub};
use crate::relay::types::{ConnId, Delivery, PreparedFrame, PushOutcome};

/// One connection's delivery handle, as seen by its room.
#[derive(Clone)]
pub struct Connection {
    pub id: ConnId,
    pub outbox: Arc<Outbox>,
}

struct Member {
    identity: Identity,
    conn: Connection,
}

#[derive(Default)]
struct RoomState {
    /// Join order.
    members: Vec<Member>,
    /// Set when the registry dropped this room. Stale handles must not admit.
    retired: bool,
}

/// A named group of initialized connections.
///
/// Every membership change and every recipient enumeration happens under the
/// one `state` lock, so a join's announcement and its stable replay see the
/// same snapshot, and nobody is sent a frame after their removal is visible.
pub struct Room {
    id: Arc<str>,
    state: Mutex<RoomState>,
}

pub(crate) enum Admission {
    Admitted(JoinReport),
    Taken,
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinReport {
    /// `{sender: new, join: true}` offered to existing members.
    pub announced: Delivery,
    /// `{sender: existing, join: true, stable: true}` offered to the newcomer.
    pub replayed: Delivery,
    /// Occupancy update offered to the room's watchers.
    pub notified: Delivery,
    /// Membership size including the newcomer.
    pub members: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveReport {
    pub identity: Identity,
    pub announced: Delivery,
    pub notified: Delivery,
    pub remaining: usize,
}

impl Room {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(RoomState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) async fn admit(
        &self,
        identity: Identity,
        conn: Connection,
        watchers: &WatchHub,
    ) -> Result<Admission> {
        let mut state = self.state.lock().await;
        if state.retired {
            return Ok(Admission::Retired);
        }
        if state.members.iter().any(|m| m.identity == identity) {
            return Ok(Admission::Taken);
        }

        let arrival = PreparedFrame::prepare(&ServerEnvelope::join(identity.clone()))?;
        let mut announced = Delivery::default();
        for m in &state.members {
            announced.record(m.conn.outbox.push(arrival.clone()));
        }

        let mut replayed = Delivery::default();
        for m in &state.members {
            let frame = PreparedFrame::prepare(&ServerEnvelope::stable_join(m.identity.clone()))?;
            replayed.record(conn.outbox.push(frame));
        }

        state.members.push(Member { identity, conn });
        let notified = watchers.notify(&self.id, state.members.len());

        Ok(Admission::Admitted(JoinReport {
            announced,
            replayed,
            notified,
            members: state.members.len(),
        }))
    }

    /// Remove the member owned by `conn` and announce it to the rest.
    /// `None` if `conn` is not (or no longer) a member.
    pub(crate) async fn depart(&self, conn: ConnId, watchers: &WatchHub) -> Option<LeaveReport> {
        let mut state = self.state.lock().await;
        let pos = state.members.iter().position(|m| m.conn.id == conn)?;
        let Member { identity, .. } = state.members.remove(pos);

        let mut announced = Delivery::default();
        match PreparedFrame::prepare(&ServerEnvelope::leave(identity.clone())) {
            Ok(frame) => {
                for m in &state.members {
                    announced.record(m.conn.outbox.push(frame.clone()));
                }
            }
            Err(e) => {
                tracing::error!(room = %self.id, %identity, error = %e, "leave announcement not encodable");
            }
        }

        let notified = watchers.notify(&self.id, state.members.len());

        Some(LeaveReport {
            identity,
            announced,
            notified,
            remaining: state.members.len(),
        })
    }

    /// Directed relay. `None` when no member holds `recipient`.
    pub async fn send_to(&self, recipient: &Identity, frame: &PreparedFrame) -> Option<PushOutcome> {
        let state = self.state.lock().await;
        state
            .members
            .iter()
            .find(|m| &m.identity == recipient)
            .map(|m| m.conn.outbox.push(frame.clone()))
    }

    /// Broadcast relay to every member except `from`.
    pub async fn broadcast(&self, from: ConnId, frame: &PreparedFrame) -> Delivery {
        let state = self.state.lock().await;
        let mut delivery = Delivery::default();
        for m in state.members.iter().filter(|m| m.conn.id != from) {
            delivery.record(m.conn.outbox.push(frame.clone()));
        }
        delivery
    }

    /// Identities in join order.
    pub async fn members(&self) -> Vec<Identity> {
        let state = self.state.lock().await;
        state.members.iter().map(|m| m.identity.clone()).collect()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.members.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Push the current occupancy to one watcher. Serialized with joins and
    /// leaves, so it never overtakes a later update. Retired rooms report
    /// nothing.
    pub(crate) async fn report_to(&self, outbox: &Outbox) -> Option<usize> {
        let state = self.state.lock().await;
        if state.retired {
            return None;
        }
        let count = state.members.len();
        match PreparedFrame::room_info(&RoomInfo::new(&*self.id, count)) {
            Ok(frame) => {
                outbox.push(frame);
                Some(count)
            }
            Err(e) => {
                tracing::error!(room = %self.id, error = %e, "room info not encodable");
                None
            }
        }
    }

    pub async fn is_retired(&self) -> bool {
        self.state.lock().await.retired
    }

    /// Retire the room if nobody is in it, running `unregister` while the
    /// lock is still held. Joiners blocked on the lock then see `retired`
    /// and go back to the registry.
    pub(crate) async fn retire_if_empty(&self, unregister: impl FnOnce()) -> bool {
        let mut state = self.state.lock().await;
        if state.retired || !state.members.is_empty() {
            return false;
        }
        state.retired = true;
        unregister();
        true
    }
}
