//! Signaling relay: room membership, message fan-out, and cleanup.
//!
//! - `core`: rooms, the registry that owns them, per-recipient outboxes.
//! - `membership`: the join handshake and exactly-once leave.
//! - `router`: directed and broadcast relay of opaque payloads.
//! - `watch`: room occupancy subscriptions.

pub mod core;
pub mod membership;
pub mod router;
pub mod types;
pub mod watch;

pub use self::core::{Connection, JoinReport, LeaveReport, Outbox, Room, RoomRegistry, WatchHub};
pub use membership::Membership;
pub use router::{route, RouteOutcome};
pub use types::{ConnId, Delivery, PreparedFrame, PushOutcome};
pub use watch::WatchSubscription;
