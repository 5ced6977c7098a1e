//! Participant identity and the naming handshake.
//!
//! The first text frame on a fresh channel is not an envelope: it is the
//! identity string the participant proposes for itself. It is taken verbatim
//! (no trimming, no JSON decoding).

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Opaque participant name, unique within a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Validate a handshake frame as an identity.
    ///
    /// Empty names are rejected, as are names longer than `max_bytes`.
    pub fn from_handshake(raw: &str, max_bytes: usize) -> Result<Self> {
        if raw.is_empty() {
            return Err(RelayError::BadRequest("empty identity".into()));
        }
        if raw.len() > max_bytes {
            return Err(RelayError::PayloadTooLarge);
        }
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Borrow<str> for Identity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Identity {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identity {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
