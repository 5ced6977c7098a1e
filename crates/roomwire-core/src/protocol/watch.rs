//! Room watch channel.
//!
//! A watcher sends a JSON array of room ids; each frame replaces the previous
//! list. The server answers with one `{ "room": string, "user_count": n }`
//! frame per watched room that currently exists, then another one every time
//! a member joins or leaves a watched room.

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Occupancy update pushed to watchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomInfo {
    pub room: String,
    pub user_count: usize,
}

impl RoomInfo {
    pub fn new(room: impl Into<String>, user_count: usize) -> Self {
        Self {
            room: room.into(),
            user_count,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| RelayError::Internal(format!("room info encode failed: {e}")))
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| RelayError::BadRequest(format!("invalid room info: {e}")))
    }
}

/// Decode a watch list. Duplicates are collapsed, order is kept.
///
/// `max_rooms` bounds the list after deduplication; longer lists are
/// rejected whole.
pub fn decode_watch_list(text: &str, max_rooms: usize) -> Result<Vec<String>> {
    let rooms: Vec<String> = serde_json::from_str(text)
        .map_err(|e| RelayError::BadRequest(format!("watch list must be a json array of strings: {e}")))?;

    let mut unique: Vec<String> = Vec::with_capacity(rooms.len());
    for room in rooms {
        if room.is_empty() {
            return Err(RelayError::BadRequest("empty room id in watch list".into()));
        }
        if !unique.contains(&room) {
            unique.push(room);
        }
    }
    if unique.len() > max_rooms {
        return Err(RelayError::PayloadTooLarge);
    }
    Ok(unique)
}
