//! Signaling wire formats.
//!
//! - `identity`: the naming handshake (first frame on a fresh channel).
//! - `inbound`: client -> server messages after the handshake.
//! - `outbound`: server -> client envelopes (join / leave / relayed data).
//! - `watch`: room occupancy subscriptions.
//!
//! All decoders are panic-free: malformed input is reported as `RelayError`
//! so the relay can drop it without touching the connection.

pub mod identity;
pub mod inbound;
pub mod outbound;
pub mod watch;

pub use identity::Identity;
pub use inbound::{decode_client, ClientMessage};
pub use outbound::ServerEnvelope;
pub use watch::{decode_watch_list, RoomInfo};
