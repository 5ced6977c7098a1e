//! Relay router: forwards decoded client messages within the sender's room.

use std::time::{Duration, Instant};

use roomwire_core::error::Result;
use roomwire_core::{ClientMessage, Identity, ServerEnvelope};

use crate::relay::membership::Membership;
use crate::relay::types::{Delivery, PreparedFrame, PushOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Heartbeat: nothing forwarded.
    Heartbeat,
    /// `outcome` is `None` when the recipient is not in the room.
    Directed {
        recipient: Identity,
        outcome: Option<PushOutcome>,
    },
    Broadcast {
        delivery: Delivery,
        elapsed: Duration,
    },
}

/// Route one message from `sender`. The payload is never inspected.
pub async fn route(sender: &Membership, msg: ClientMessage) -> Result<RouteOutcome> {
    match msg {
        ClientMessage::Ping => Ok(RouteOutcome::Heartbeat),
        ClientMessage::Relay {
            recipient: Some(recipient),
            payload,
        } => {
            let frame =
                PreparedFrame::prepare(&ServerEnvelope::relay(sender.identity().clone(), payload))?;
            let outcome = sender.room().send_to(&recipient, &frame).await;
            Ok(RouteOutcome::Directed { recipient, outcome })
        }
        ClientMessage::Relay {
            recipient: None,
            payload,
        } => {
            let started = Instant::now();
            let frame =
                PreparedFrame::prepare(&ServerEnvelope::relay(sender.identity().clone(), payload))?;
            let delivery = sender.room().broadcast(sender.conn_id(), &frame).await;
            Ok(RouteOutcome::Broadcast {
                delivery,
                elapsed: started.elapsed(),
            })
        }
    }
}
