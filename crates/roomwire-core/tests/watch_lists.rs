//! Room watch wire format tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::json;

use roomwire_core::protocol::decode_watch_list;
use roomwire_core::RoomInfo;

#[test]
fn watch_list_keeps_order_and_collapses_duplicates() {
    let rooms = decode_watch_list(r#"["b","a","b","c"]"#, 8).unwrap();
    assert_eq!(rooms, vec!["b", "a", "c"]);
}

#[test]
fn empty_watch_list_clears_everything() {
    assert!(decode_watch_list("[]", 8).unwrap().is_empty());
}

#[test]
fn malformed_watch_lists_are_bad_requests() {
    for frame in [r#"{"rooms":["a"]}"#, r#"["a",1]"#, "a", r#"["a",""]"#] {
        let err = decode_watch_list(frame, 8).expect_err(frame);
        assert_eq!(err.kind().as_str(), "BAD_REQUEST", "{frame}");
    }
}

#[test]
fn watch_list_limit_counts_distinct_rooms() {
    assert_eq!(decode_watch_list(r#"["a","a","a"]"#, 1).unwrap(), vec!["a"]);
    let err = decode_watch_list(r#"["a","b"]"#, 1).expect_err("over limit");
    assert_eq!(err.kind().as_str(), "PAYLOAD_TOO_LARGE");
}

#[test]
fn room_info_wire_shape() {
    let text = RoomInfo::new("abc", 3).to_json().unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v, json!({"room": "abc", "user_count": 3}));
    assert_eq!(RoomInfo::from_json(&text).unwrap(), RoomInfo::new("abc", 3));
    assert!(RoomInfo::from_json(r#"{"room":"abc","user_count":3,"x":1}"#).is_err());
}
