#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use roomwire_core::Identity;
use roomwire_gateway::app_state::AppState;
use roomwire_gateway::config::{GatewayConfig, OverflowPolicy};
use roomwire_gateway::ops;
use roomwire_gateway::relay::{Connection, Membership, Outbox};

async fn body(resp: Response) -> (StatusCode, String) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1 << 20).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn state(room_info: bool) -> AppState {
    let mut cfg = GatewayConfig::default();
    cfg.features.room_info = room_info;
    AppState::new(cfg).unwrap()
}

async fn seat(state: &AppState, room: &str, name: &str) -> Membership {
    let registry = state.registry();
    let conn = Connection {
        id: registry.next_conn_id(),
        outbox: Arc::new(Outbox::new(8, OverflowPolicy::DropOldest)),
    };
    Membership::establish(registry, room, Identity::from(name), conn)
        .await
        .unwrap()
        .0
}

#[tokio::test]
async fn readiness_flips_when_draining() {
    let st = state(false);
    let (code, _) = body(ops::readyz(State(st.clone())).await.into_response()).await;
    assert_eq!(code, StatusCode::OK);

    st.set_draining();
    let (code, text) = body(ops::readyz(State(st.clone())).await.into_response()).await;
    assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(text, "draining");

    let (code, _) = body(ops::healthz().await.into_response()).await;
    assert_eq!(code, StatusCode::OK);
}

#[tokio::test]
async fn room_info_reports_user_count() {
    let st = state(true);
    let _a = seat(&st, "r1", "alice").await;
    let _b = seat(&st, "r1", "bob").await;

    let (code, text) = body(ops::room_info(State(st.clone()), Path("r1".into())).await).await;
    assert_eq!(code, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v, serde_json::json!({"room": "r1", "user_count": 2}));

    let (_, text) = body(ops::room_info(State(st), Path("empty".into())).await).await;
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["user_count"], 0);
}

#[tokio::test]
async fn room_info_is_hidden_when_disabled() {
    let st = state(false);
    let _a = seat(&st, "r1", "alice").await;
    let (code, _) = body(ops::room_info(State(st), Path("r1".into())).await).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_expose_rooms_members_and_counters() {
    let st = state(false);
    let _a = seat(&st, "r1", "alice").await;
    st.metrics().joins.inc(&[("result", "admitted")]);
    st.metrics().dropped.inc(&[("reason", "malformed")]);

    let (code, text) = body(ops::metrics(State(st)).await).await;
    assert_eq!(code, StatusCode::OK);
    assert!(text.contains("roomwire_rooms 1"), "{text}");
    assert!(text.contains("roomwire_room_members 1"), "{text}");
    assert!(text.contains("roomwire_joins_total{result=\"admitted\"} 1"), "{text}");
    assert!(text.contains("roomwire_dropped_total{reason=\"malformed\"} 1"), "{text}");
    assert!(text.contains("roomwire_draining 0"), "{text}");
}
