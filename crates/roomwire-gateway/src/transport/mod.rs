//! Transport layer (WebSocket).
//!
//! Exposes the signaling and room watch upgrade handlers and the frame codec that turns WS
//! messages into protocol text before they reach the relay.

pub mod codec;
pub mod watch;
pub mod ws;
