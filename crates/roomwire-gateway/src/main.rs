//! roomwire gateway
//!
//! - WebSocket signaling endpoint: /signaling/:room
//! - First frame names the participant; later frames are relayed in the room
//! - Ops: /healthz, /readyz, /metrics, /v1/rooms/:room
//!
//! Config: first CLI argument, else `ROOMWIRE_CONFIG`, else `roomwire.yaml`
//! (built-in defaults when that file does not exist).

use tracing_subscriber::{fmt, EnvFilter};

use roomwire_core::error::{RelayError, Result};
use roomwire_gateway::{app_state::AppState, config, ops, router};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "roomwire-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ROOMWIRE_CONFIG").ok())
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());

    let cfg = config::load_or_default(&path)?;
    let listen = cfg.gateway.listen_addr()?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| RelayError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "roomwire-gateway starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(ops::shutdown_signal(state))
        .await
        .map_err(|e| RelayError::Internal(format!("server failed: {e}")))?;

    tracing::info!("roomwire-gateway stopped");
    Ok(())
}
