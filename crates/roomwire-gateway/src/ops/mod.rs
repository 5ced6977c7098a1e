//! Operational HTTP endpoints.
//!
//! - `/healthz`        : liveness
//! - `/readyz`         : readiness (503 when draining)
//! - `/metrics`        : Prometheus text format
//! - `/v1/rooms/:room` : room occupancy (behind `features.room_info`)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let extra = state.metrics_extra();
    let body = state.metrics().render(&extra);

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Member count of one room. Rooms are looked up by exact id only; there is
/// deliberately no listing, since ids are derived from shared secrets.
pub async fn room_info(State(state): State<AppState>, Path(room): Path<String>) -> Response {
    if !state.cfg().features.room_info {
        return StatusCode::NOT_FOUND.into_response();
    }

    let user_count = match state.registry().get(&room) {
        Some(r) => r.len().await,
        None => 0,
    };

    Json(json!({ "room": room, "user_count": user_count })).into_response()
}

/// Resolves on Ctrl-C or SIGTERM, flipping readiness to draining first.
pub async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.set_draining();
    tracing::info!("shutdown signal received, draining");
}
