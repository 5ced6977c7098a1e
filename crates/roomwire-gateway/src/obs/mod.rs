//! Lightweight in-process metrics.
//!
//! Stored as atomics and rendered as Prometheus text by the `/metrics` handler.

pub mod metrics;

pub use metrics::RelayMetrics;
