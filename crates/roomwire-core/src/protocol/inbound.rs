//! Client -> server messages (after the naming handshake).
//!
//! Wire shape: `{ "recipient"?: string, ...opaque payload fields }`.
//! The recipient key is stripped; whatever remains is forwarded untouched.

use serde_json::{Map, Value};

use crate::error::{RelayError, Result};
use crate::protocol::identity::Identity;

/// Key naming the directed-relay target.
pub const RECIPIENT_KEY: &str = "recipient";
/// Key used by the legacy web client for the same purpose.
pub const LEGACY_RECIPIENT_KEY: &str = "receiver";

/// Decoded client message. Closed set: the router matches it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// `{}`: heartbeat, never forwarded.
    Ping,
    /// Opaque signaling payload, to one member or to the whole room.
    Relay {
        recipient: Option<Identity>,
        payload: Map<String, Value>,
    },
}

impl ClientMessage {
    pub fn is_ping(&self) -> bool {
        matches!(self, ClientMessage::Ping)
    }
}

/// Decode one text frame received after the handshake.
pub fn decode_client(text: &str) -> Result<ClientMessage> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| RelayError::BadRequest(format!("invalid json: {e}")))?;

    let Value::Object(mut payload) = value else {
        return Err(RelayError::BadRequest("message must be a json object".into()));
    };

    if payload.is_empty() {
        return Ok(ClientMessage::Ping);
    }

    let recipient = match take_recipient(&mut payload, RECIPIENT_KEY)? {
        // an explicit recipient wins; the legacy key is discarded unread
        Some(explicit) => {
            payload.remove(LEGACY_RECIPIENT_KEY);
            Some(explicit)
        }
        None => take_recipient(&mut payload, LEGACY_RECIPIENT_KEY)?,
    };

    Ok(ClientMessage::Relay { recipient, payload })
}

// null and "" both mean "no recipient" (broadcast).
fn take_recipient(payload: &mut Map<String, Value>, key: &str) -> Result<Option<Identity>> {
    match payload.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(Identity::from(s))),
        Some(_) => Err(RelayError::BadRequest(format!("{key} must be a string"))),
    }
}
