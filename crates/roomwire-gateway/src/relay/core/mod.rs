//! Relay core: per-recipient queues, rooms, the room registry and room watchers.

mod outbox;
mod registry;
mod room;
mod watch;

pub use outbox::Outbox;
pub use registry::RoomRegistry;
pub use room::{Connection, JoinReport, LeaveReport, Room};
pub use watch::WatchHub;
