use std::fmt;
use std::sync::Arc;

use axum::extract::ws::Message;

use roomwire_core::error::Result;
use roomwire_core::{RoomInfo, ServerEnvelope};

/// Process-local connection id. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Envelope serialized once and shared by every recipient queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedFrame(Arc<str>);

impl PreparedFrame {
    pub fn prepare(env: &ServerEnvelope) -> Result<Self> {
        Ok(Self(env.to_json()?.into()))
    }

    pub fn room_info(info: &RoomInfo) -> Result<Self> {
        Ok(Self(info.to_json()?.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to axum::ws::Message for transport.
    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.0.to_string())
    }
}

/// Result of offering a frame to one recipient queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// Queue was full; the oldest frame was evicted to make room.
    DisplacedOldest,
    /// Queue was full; the new frame was discarded.
    DroppedNewest,
    /// Recipient is shutting down.
    Closed,
}

impl PushOutcome {
    /// Whether the offered frame itself is now queued.
    pub fn is_queued(self) -> bool {
        matches!(self, PushOutcome::Queued | PushOutcome::DisplacedOldest)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PushOutcome::Queued => "queued",
            PushOutcome::DisplacedOldest => "displaced_oldest",
            PushOutcome::DroppedNewest => "dropped_newest",
            PushOutcome::Closed => "closed",
        }
    }
}

/// Fan-out tally for one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub attempted: usize,
    pub queued: usize,
    /// Frames lost to a full queue (evicted or discarded).
    pub overflowed: usize,
    pub closed: usize,
}

impl Delivery {
    pub fn record(&mut self, outcome: PushOutcome) {
        self.attempted += 1;
        match outcome {
            PushOutcome::Queued => self.queued += 1,
            PushOutcome::DisplacedOldest => {
                self.queued += 1;
                self.overflowed += 1;
            }
            PushOutcome::DroppedNewest => self.overflowed += 1,
            PushOutcome::Closed => self.closed += 1,
        }
    }
}
