//! roomwire gateway library entry.
//!
//! Wires the WebSocket transport, the relay (registry, membership, router)
//! and the ops endpoints into one axum application. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod relay;
pub mod router;
pub mod transport;
