//! WebSocket signaling session.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS on `/signaling/:room`
//! - Naming handshake: the first text frame is the participant identity
//! - Relay every later frame through the room router
//! - Drain this connection's outbox to the socket
//! - Leave the room exactly once when the channel ends, however it ends
//!
//! One task per connection. It only ever waits on its own socket and its own
//! outbox, so a slow peer stalls nobody but itself.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use tokio::time::{Duration, Instant};
use tracing::{field, Instrument};

use roomwire_core::error::{RelayError, Result};
use roomwire_core::protocol::decode_client;
use roomwire_core::Identity;

use crate::app_state::AppState;
use crate::relay::{route, ConnId, Connection, Membership, Outbox, PushOutcome, RouteOutcome};
use crate::transport::codec::{decode, Inbound};

enum Phase {
    AwaitingIdentity,
    Joined(Membership),
}

/// Why the session loop stopped.
#[derive(Debug, Clone, Copy)]
enum End {
    PeerClosed,
    SocketError,
    Rejected,
}

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(
    State(app): State<AppState>,
    Path(room): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    app.metrics().ws_upgrades.inc(&[]);
    let max_frame = app.cfg().gateway.max_frame_bytes;

    ws.max_message_size(max_frame)
        .max_frame_size(max_frame)
        .on_upgrade(move |socket| async move {
            let conn = app.registry().next_conn_id();
            let span = tracing::info_span!("session", %room, %conn, identity = field::Empty);
            run_session(app, room, conn, socket).instrument(span).await;
        })
}

// --------------------
// Core session loop
// --------------------
async fn run_session(app: AppState, room_id: String, conn_id: ConnId, socket: WebSocket) {
    let metrics = app.metrics();
    metrics.sessions_active.inc(&[]);

    let relay_cfg = &app.cfg().relay;
    let outbox = Arc::new(Outbox::new(relay_cfg.queue_capacity, relay_cfg.overflow));

    let (mut ws_tx, mut ws_rx) = socket.split();

    let gw = &app.cfg().gateway;
    let ping_enabled = gw.ping_interval_ms > 0;
    let ping_every = Duration::from_millis(gw.ping_interval_ms.max(1));
    let mut ping_tick = tokio::time::interval_at(Instant::now() + ping_every, ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut phase = Phase::AwaitingIdentity;

    let end = loop {
        tokio::select! {
            // outbound writer
            frame = outbox.recv() => {
                let Some(frame) = frame else { break End::PeerClosed; };
                if ws_tx.send(frame.to_ws_message()).await.is_err() {
                    break End::SocketError;
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let msg = match incoming {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "websocket read failed");
                        break End::SocketError;
                    }
                    None => break End::PeerClosed,
                };

                match decode(msg) {
                    Ok(Inbound::Text(text)) => match phase {
                        Phase::AwaitingIdentity => {
                            match handshake(&app, &room_id, conn_id, &outbox, &text).await {
                                Ok(membership) => phase = Phase::Joined(membership),
                                Err(e) => {
                                    reject(&mut ws_tx, &e).await;
                                    break End::Rejected;
                                }
                            }
                        }
                        Phase::Joined(ref membership) => relay_text(&app, membership, &text).await,
                    },
                    Ok(Inbound::Ping) | Ok(Inbound::Pong) => {}
                    Ok(Inbound::Close) => break End::PeerClosed,
                    Err(e) => match phase {
                        Phase::AwaitingIdentity => {
                            app.metrics().joins.inc(&[("result", "bad_identity")]);
                            reject(&mut ws_tx, &e).await;
                            break End::Rejected;
                        }
                        Phase::Joined(_) => {
                            app.metrics().dropped.inc(&[("reason", "malformed")]);
                            tracing::debug!(error = %e, "undecodable frame dropped");
                        }
                    },
                }
            }

            // transport-level liveness
            _ = ping_tick.tick(), if ping_enabled => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break End::SocketError;
                }
            }
        }
    };

    outbox.close();

    if let Phase::Joined(membership) = phase {
        if let Some(report) = membership.leave().await {
            metrics.leaves.inc(&[]);
            count_undelivered(
                &app,
                report.announced.overflowed + report.notified.overflowed,
                report.announced.closed + report.notified.closed,
            );
            tracing::info!(
                identity = %report.identity,
                remaining = report.remaining,
                ?end,
                "left"
            );
        }
    } else {
        tracing::debug!(?end, "closed before joining");
    }

    metrics.sessions_active.dec(&[]);
}

// --------------------
// Membership handshake
// --------------------
async fn handshake(
    app: &AppState,
    room_id: &str,
    conn_id: ConnId,
    outbox: &Arc<Outbox>,
    text: &str,
) -> Result<Membership> {
    let identity = match Identity::from_handshake(text, app.cfg().gateway.max_identity_bytes) {
        Ok(identity) => identity,
        Err(e) => {
            app.metrics().joins.inc(&[("result", "bad_identity")]);
            return Err(e);
        }
    };

    let conn = Connection {
        id: conn_id,
        outbox: Arc::clone(outbox),
    };

    match Membership::establish(app.registry(), room_id, identity.clone(), conn).await {
        Ok((membership, report)) => {
            app.metrics().joins.inc(&[("result", "admitted")]);
            count_undelivered(
                app,
                report.announced.overflowed + report.replayed.overflowed + report.notified.overflowed,
                report.announced.closed + report.replayed.closed + report.notified.closed,
            );
            tracing::Span::current().record("identity", field::display(&identity));
            tracing::info!(members = report.members, "joined");
            Ok(membership)
        }
        Err(e) => {
            if matches!(e, RelayError::IdentityTaken(_)) {
                app.metrics().joins.inc(&[("result", "identity_taken")]);
                tracing::info!(%identity, "identity already in room, closing");
            }
            Err(e)
        }
    }
}

async fn reject(ws_tx: &mut SplitSink<WebSocket, Message>, err: &RelayError) {
    tracing::debug!(error = %err, "rejecting connection");
    let frame = CloseFrame {
        code: close_code::POLICY,
        reason: err.kind().as_str().into(),
    };
    let _ = ws_tx.send(Message::Close(Some(frame))).await;
}

// --------------------
// Relay
// --------------------
async fn relay_text(app: &AppState, membership: &Membership, text: &str) {
    let metrics = app.metrics();

    let msg = match decode_client(text) {
        Ok(msg) => msg,
        Err(e) => {
            metrics.dropped.inc(&[("reason", "malformed")]);
            tracing::debug!(error = %e, "malformed message dropped");
            return;
        }
    };

    match route(membership, msg).await {
        Ok(RouteOutcome::Heartbeat) => metrics.heartbeats.inc(&[]),
        Ok(RouteOutcome::Directed {
            recipient,
            outcome: Some(outcome),
        }) => {
            metrics.relayed.inc(&[("mode", "direct")]);
            match outcome {
                PushOutcome::Queued => {}
                PushOutcome::DisplacedOldest | PushOutcome::DroppedNewest => {
                    metrics.dropped.inc(&[("reason", "overflow")])
                }
                PushOutcome::Closed => metrics.dropped.inc(&[("reason", "closed")]),
            }
            tracing::debug!(to = %recipient, bytes = text.len(), outcome = outcome.as_str(), "relayed");
        }
        Ok(RouteOutcome::Directed {
            recipient,
            outcome: None,
        }) => {
            metrics.dropped.inc(&[("reason", "unknown_recipient")]);
            tracing::debug!(to = %recipient, "recipient not in room, dropped");
        }
        Ok(RouteOutcome::Broadcast { delivery, elapsed }) => {
            metrics.relayed.inc(&[("mode", "broadcast")]);
            metrics.fanout_duration.observe(&[("mode", "broadcast")], elapsed);
            count_undelivered(app, delivery.overflowed, delivery.closed);
            tracing::debug!(to = "*", bytes = text.len(), recipients = delivery.attempted, "relayed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "relay failed");
        }
    }
}

fn count_undelivered(app: &AppState, overflowed: usize, closed: usize) {
    let metrics = app.metrics();
    if overflowed > 0 {
        metrics.dropped.add(&[("reason", "overflow")], overflowed as u64);
    }
    if closed > 0 {
        metrics.dropped.add(&[("reason", "closed")], closed as u64);
    }
}
