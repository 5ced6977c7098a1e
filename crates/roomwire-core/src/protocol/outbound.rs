//! Server -> client envelopes.
//!
//! Wire shape:
//! ```text
//! { "sender": string, "data"?: object, "join"?: true, "leave"?: true, "stable"?: true }
//! ```
//! Exactly one of `data`, `join`, `leave` is present; `stable` only rides
//! along with `join` and marks a peer that was already in the room.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RelayError, Result};
use crate::protocol::identity::Identity;

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEnvelope {
    /// `stable == false`: a live arrival. `stable == true`: replay of a peer
    /// that was present before the receiver joined.
    Join { sender: Identity, stable: bool },
    Leave { sender: Identity },
    Relay {
        sender: Identity,
        data: Map<String, Value>,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Wire<'a> {
    #[serde(borrow)]
    sender: std::borrow::Cow<'a, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<std::borrow::Cow<'a, Map<String, Value>>>,
    #[serde(default, skip_serializing_if = "is_false")]
    join: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    leave: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    stable: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ServerEnvelope {
    pub fn join(sender: Identity) -> Self {
        ServerEnvelope::Join {
            sender,
            stable: false,
        }
    }

    pub fn stable_join(sender: Identity) -> Self {
        ServerEnvelope::Join {
            sender,
            stable: true,
        }
    }

    pub fn leave(sender: Identity) -> Self {
        ServerEnvelope::Leave { sender }
    }

    pub fn relay(sender: Identity, data: Map<String, Value>) -> Self {
        ServerEnvelope::Relay { sender, data }
    }

    pub fn sender(&self) -> &Identity {
        match self {
            ServerEnvelope::Join { sender, .. }
            | ServerEnvelope::Leave { sender }
            | ServerEnvelope::Relay { sender, .. } => sender,
        }
    }

    /// Serialize to the text frame sent on the wire.
    pub fn to_json(&self) -> Result<String> {
        let wire = match self {
            ServerEnvelope::Join { sender, stable } => Wire {
                sender: sender.as_str().into(),
                data: None,
                join: true,
                leave: false,
                stable: *stable,
            },
            ServerEnvelope::Leave { sender } => Wire {
                sender: sender.as_str().into(),
                data: None,
                join: false,
                leave: true,
                stable: false,
            },
            ServerEnvelope::Relay { sender, data } => Wire {
                sender: sender.as_str().into(),
                data: Some(std::borrow::Cow::Borrowed(data)),
                join: false,
                leave: false,
                stable: false,
            },
        };
        serde_json::to_string(&wire)
            .map_err(|e| RelayError::Internal(format!("envelope encode failed: {e}")))
    }

    /// Strict decoder for clients and tests. Enforces the envelope invariants.
    pub fn from_json(s: &str) -> Result<Self> {
        let wire: Wire<'_> = serde_json::from_str(s)
            .map_err(|e| RelayError::BadRequest(format!("invalid envelope json: {e}")))?;
        let sender = Identity::from(wire.sender.into_owned());

        match (wire.data, wire.join, wire.leave, wire.stable) {
            (Some(data), false, false, false) => Ok(ServerEnvelope::Relay {
                sender,
                data: data.into_owned(),
            }),
            (None, true, false, stable) => Ok(ServerEnvelope::Join { sender, stable }),
            (None, false, true, false) => Ok(ServerEnvelope::Leave { sender }),
            (_, _, _, true) => Err(RelayError::BadRequest(
                "stable is only valid together with join".into(),
            )),
            _ => Err(RelayError::BadRequest(
                "envelope must carry exactly one of data, join, leave".into(),
            )),
        }
    }
}
