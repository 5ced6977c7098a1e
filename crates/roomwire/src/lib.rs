//! Top-level facade crate for roomwire.
//!
//! Re-exports the wire contracts and the signaling gateway so users can depend
//! on a single crate.

pub mod core {
    pub use roomwire_core::*;
}

pub mod gateway {
    pub use roomwire_gateway::*;
}
