use std::net::SocketAddr;

use serde::Deserialize;
use roomwire_core::error::{RelayError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub relay: RelaySection,

    #[serde(default)]
    pub features: FeaturesSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            relay: RelaySection::default(),
            features: FeaturesSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.relay.validate()?;
        self.features.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Transport-level ping cadence. `0` disables pings.
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    #[serde(default = "default_max_identity_bytes")]
    pub max_identity_bytes: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            max_frame_bytes: default_max_frame_bytes(),
            max_identity_bytes: default_max_identity_bytes(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.ping_interval_ms != 0 && !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(RelayError::BadRequest(
                "gateway.ping_interval_ms must be 0 or between 5000 and 120000".into(),
            ));
        }
        if !(1024..=16 * 1024 * 1024).contains(&self.max_frame_bytes) {
            return Err(RelayError::BadRequest(
                "gateway.max_frame_bytes must be between 1024 and 16777216".into(),
            ));
        }
        if !(1..=4096).contains(&self.max_identity_bytes) {
            return Err(RelayError::BadRequest(
                "gateway.max_identity_bytes must be between 1 and 4096".into(),
            ));
        }
        if self.max_identity_bytes > self.max_frame_bytes {
            return Err(RelayError::BadRequest(
                "gateway.max_identity_bytes must not exceed max_frame_bytes".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            RelayError::BadRequest(format!(
                "gateway.listen must be a valid SocketAddr, got {:?}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_max_frame_bytes() -> usize {
    64 * 1024
}
fn default_max_identity_bytes() -> usize {
    256
}

/// What to do when a recipient's send queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest queued frame to make room for the new one.
    #[default]
    DropOldest,
    /// Keep the queue as is and discard the new frame.
    DropNewest,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    /// Per-recipient queue depth, in frames.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default)]
    pub overflow: OverflowPolicy,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            overflow: OverflowPolicy::default(),
        }
    }
}

impl RelaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.queue_capacity) {
            return Err(RelayError::BadRequest(
                "relay.queue_capacity must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }
}

fn default_queue_capacity() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturesSection {
    /// Expose `GET /v1/rooms/:room` occupancy lookups.
    #[serde(default)]
    pub room_info: bool,

    /// Expose the `/watch` channel pushing occupancy of listed rooms.
    #[serde(default)]
    pub room_watches: bool,

    #[serde(default = "default_max_watched_rooms")]
    pub max_watched_rooms: usize,
}

impl Default for FeaturesSection {
    fn default() -> Self {
        Self {
            room_info: false,
            room_watches: false,
            max_watched_rooms: default_max_watched_rooms(),
        }
    }
}

impl FeaturesSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=1024).contains(&self.max_watched_rooms) {
            return Err(RelayError::BadRequest(
                "features.max_watched_rooms must be between 1 and 1024".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_watched_rooms() -> usize {
    64
}
