//! WebSocket room watch session on `/watch`.
//!
//! Every text frame is a JSON array of room ids replacing the previous list.
//! The session pushes `{room, user_count}` frames for the listed rooms as
//! members join and leave. Gated by `features.room_watches`.

use std::sync::Arc;

use axum::{
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{Duration, Instant};
use tracing::Instrument;

use roomwire_core::protocol::decode_watch_list;

use crate::app_state::AppState;
use crate::relay::{ConnId, Outbox, WatchSubscription};
use crate::transport::codec::{decode, Inbound};

pub async fn watch_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    if !app.cfg().features.room_watches {
        return StatusCode::NOT_FOUND.into_response();
    }
    app.metrics().ws_upgrades.inc(&[]);
    let max_frame = app.cfg().gateway.max_frame_bytes;

    ws.max_message_size(max_frame)
        .max_frame_size(max_frame)
        .on_upgrade(move |socket| async move {
            let conn = app.registry().next_conn_id();
            let span = tracing::info_span!("watch", %conn);
            run_watch(app, conn, socket).instrument(span).await;
        })
}

async fn run_watch(app: AppState, conn: ConnId, socket: WebSocket) {
    let metrics = app.metrics();
    metrics.watch_sessions_active.inc(&[]);

    let relay_cfg = &app.cfg().relay;
    let outbox = Arc::new(Outbox::new(relay_cfg.queue_capacity, relay_cfg.overflow));
    let mut subscription = WatchSubscription::new(app.registry(), conn, Arc::clone(&outbox));
    let max_rooms = app.cfg().features.max_watched_rooms;

    let (mut ws_tx, mut ws_rx) = socket.split();

    let gw = &app.cfg().gateway;
    let ping_enabled = gw.ping_interval_ms > 0;
    let ping_every = Duration::from_millis(gw.ping_interval_ms.max(1));
    let mut ping_tick = tokio::time::interval_at(Instant::now() + ping_every, ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            frame = outbox.recv() => {
                let Some(frame) = frame else { break };
                if ws_tx.send(frame.to_ws_message()).await.is_err() {
                    break;
                }
            }

            incoming = ws_rx.next() => {
                let msg = match incoming {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "websocket read failed");
                        break;
                    }
                    None => break,
                };

                match decode(msg) {
                    Ok(Inbound::Text(text)) => match decode_watch_list(&text, max_rooms) {
                        Ok(rooms) => {
                            subscription.replace(rooms).await;
                            tracing::debug!(rooms = subscription.rooms().len(), "watch list replaced");
                        }
                        Err(e) => {
                            metrics.dropped.inc(&[("reason", "malformed_watch")]);
                            tracing::debug!(error = %e, "watch list dropped");
                        }
                    },
                    Ok(Inbound::Ping) | Ok(Inbound::Pong) => {}
                    Ok(Inbound::Close) => break,
                    Err(e) => {
                        metrics.dropped.inc(&[("reason", "malformed_watch")]);
                        tracing::debug!(error = %e, "undecodable frame dropped");
                    }
                }
            }

            _ = ping_tick.tick(), if ping_enabled => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    outbox.close();
    drop(subscription);
    metrics.watch_sessions_active.dec(&[]);
    tracing::debug!("watch closed");
}
