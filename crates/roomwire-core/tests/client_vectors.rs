//! Client -> server message vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::Value;

use roomwire_core::protocol::{decode_client, ClientMessage};

mod vector_loader;
use vector_loader::load;

#[test]
fn client_vectors() {
    let files = [
        "client_ping.json",
        "client_broadcast.json",
        "client_directed.json",
        "client_legacy_receiver.json",
        "client_null_recipient.json",
        "client_recipient_only.json",
        "client_not_json.json",
        "client_array.json",
        "client_numeric_recipient.json",
        "client_recipient_overrides_legacy.json",
        "client_bad_legacy_with_recipient.json",
        "client_bad_legacy_alone.json",
    ];

    for f in files {
        let v = load(f);
        let res = decode_client(&v.frame);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.kind().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let msg = res.expect("expected ok message");
        let ex = v.expect.expect("missing expect block");

        match ex["kind"].as_str().unwrap() {
            "ping" => assert_eq!(msg, ClientMessage::Ping, "vector={}", v.description),
            "relay" => {
                let ClientMessage::Relay { recipient, payload } = msg else {
                    panic!("expected relay, vector={}", v.description);
                };
                match &ex["recipient"] {
                    Value::Null => assert!(recipient.is_none(), "vector={}", v.description),
                    Value::String(r) => {
                        assert_eq!(recipient.unwrap().as_str(), r, "vector={}", v.description)
                    }
                    other => panic!("bad vector recipient {other}"),
                }
                assert_eq!(Value::Object(payload), ex["payload"], "vector={}", v.description);
            }
            other => panic!("unknown kind {other}"),
        }
    }
}

#[test]
fn ping_is_only_the_empty_object() {
    assert!(decode_client("{}").unwrap().is_ping());
    assert!(decode_client("  { }  ").unwrap().is_ping());
    assert!(!decode_client(r#"{"chat":{}}"#).unwrap().is_ping());
}

#[test]
fn empty_recipient_string_broadcasts() {
    let msg = decode_client(r#"{"recipient":"","chat":{"text":"x"}}"#).unwrap();
    let ClientMessage::Relay { recipient, payload } = msg else {
        panic!("expected relay");
    };
    assert!(recipient.is_none());
    assert!(payload.contains_key("chat"));
    assert!(!payload.contains_key("recipient"));
}
