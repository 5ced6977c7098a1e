//! roomwire core: transport-agnostic wire contracts and the shared error type.
//!
//! This crate defines the messages exchanged between browsers and the
//! signaling relay, plus the error surface shared by the gateway and its
//! tests. It carries no transport or runtime dependencies so clients and test
//! harnesses can reuse it.
//!
//! # Guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! surfaces as `RelayError`/`Result`, so hostile or malformed frames can never
//! take a relay worker down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorKind, RelayError, Result};
pub use protocol::{ClientMessage, Identity, RoomInfo, ServerEnvelope};
