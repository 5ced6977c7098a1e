//! Shared application state for the roomwire gateway.
//!
//! Owns the room registry and metrics explicitly; every connection worker
//! gets a cheap clone instead of reaching for a global.

use std::sync::Arc;

use roomwire_core::error::Result;

use crate::config::GatewayConfig;
use crate::obs::RelayMetrics;
use crate::relay::RoomRegistry;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    registry: Arc<RoomRegistry>,
    metrics: Arc<RelayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            registry: Arc::new(RoomRegistry::new()),
            metrics: Arc::new(RelayMetrics::default()),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<RoomRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    /// Point-in-time gauges read from the registry at scrape time.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("roomwire_rooms", self.registry.room_count() as u64),
            ("roomwire_room_members", self.registry.member_count() as u64),
            ("roomwire_watched_rooms", self.registry.watchers().watched_rooms() as u64),
        ]
    }
}
