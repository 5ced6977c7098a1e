//! Server -> client envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::{json, Value};

use roomwire_core::{Identity, ServerEnvelope};

mod vector_loader;
use vector_loader::load;

#[test]
fn server_vectors() {
    let files = [
        "server_join.json",
        "server_stable_join.json",
        "server_leave.json",
        "server_relay.json",
        "server_join_and_leave.json",
        "server_stable_without_join.json",
        "server_sender_only.json",
        "server_unknown_field.json",
    ];

    for f in files {
        let v = load(f);
        let res = ServerEnvelope::from_json(&v.frame);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.kind().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let env = res.expect("expected ok envelope");
        let ex = v.expect.expect("missing expect block");
        assert_eq!(env.sender().as_str(), ex["sender"].as_str().unwrap(), "vector={}", v.description);

        match (ex["kind"].as_str().unwrap(), &env) {
            ("join", ServerEnvelope::Join { stable, .. }) => {
                assert_eq!(*stable, ex["stable"].as_bool().unwrap(), "vector={}", v.description)
            }
            ("leave", ServerEnvelope::Leave { .. }) => {}
            ("relay", ServerEnvelope::Relay { data, .. }) => {
                assert_eq!(Value::Object(data.clone()), ex["data"], "vector={}", v.description)
            }
            (kind, env) => panic!("kind {kind} does not match {env:?}, vector={}", v.description),
        }
    }
}

#[test]
fn encoding_omits_false_flags_and_absent_data() {
    let join: Value =
        serde_json::from_str(&ServerEnvelope::join(Identity::from("a")).to_json().unwrap()).unwrap();
    assert_eq!(join, json!({"sender": "a", "join": true}));

    let stable: Value = serde_json::from_str(
        &ServerEnvelope::stable_join(Identity::from("a"))
            .to_json()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(stable, json!({"sender": "a", "join": true, "stable": true}));

    let leave: Value =
        serde_json::from_str(&ServerEnvelope::leave(Identity::from("a")).to_json().unwrap()).unwrap();
    assert_eq!(leave, json!({"sender": "a", "leave": true}));
}

#[test]
fn relay_encoding_wraps_payload_in_data() {
    let mut payload = serde_json::Map::new();
    payload.insert("offer".into(), json!({"type": "offer", "sdp": "v=0"}));

    let text = ServerEnvelope::relay(Identity::from("alice"), payload)
        .to_json()
        .unwrap();
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        v,
        json!({"sender": "alice", "data": {"offer": {"type": "offer", "sdp": "v=0"}}})
    );
}

#[test]
fn identity_handshake_limits() {
    assert_eq!(Identity::from_handshake("alice", 16).unwrap(), "alice");
    assert_eq!(
        Identity::from_handshake("", 16).unwrap_err().kind().as_str(),
        "BAD_REQUEST"
    );
    assert_eq!(
        Identity::from_handshake("a-very-long-name", 4)
            .unwrap_err()
            .kind()
            .as_str(),
        "PAYLOAD_TOO_LARGE"
    );
    // taken verbatim, surrounding whitespace included
    assert_eq!(Identity::from_handshake(" bob ", 16).unwrap().as_str(), " bob ");
}
