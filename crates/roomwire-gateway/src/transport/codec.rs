//! Frame codec for the transport layer.
//!
//! - Text frames => protocol text (handshake identity or client message)
//! - Binary frames => protocol text if valid UTF-8, otherwise malformed
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use roomwire_core::error::{RelayError, Result};

#[derive(Debug)]
pub enum Inbound {
    Text(String),
    Ping,
    Pong,
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => Ok(Inbound::Text(s)),
        Message::Binary(b) => String::from_utf8(b)
            .map(Inbound::Text)
            .map_err(|e| RelayError::BadRequest(format!("binary frame is not utf-8: {e}"))),
        Message::Ping(_) => Ok(Inbound::Ping),
        Message::Pong(_) => Ok(Inbound::Pong),
        Message::Close(_) => Ok(Inbound::Close),
    }
}
