#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use roomwire_core::{Identity, RoomInfo};
use roomwire_gateway::config::OverflowPolicy;
use roomwire_gateway::relay::{Connection, Membership, Outbox, RoomRegistry, WatchSubscription};

fn outbox() -> Arc<Outbox> {
    Arc::new(Outbox::new(64, OverflowPolicy::DropOldest))
}

fn updates(outbox: &Outbox) -> Vec<RoomInfo> {
    outbox
        .drain()
        .iter()
        .map(|f| RoomInfo::from_json(f.as_str()).unwrap())
        .collect()
}

async fn join(registry: &Arc<RoomRegistry>, room: &str, name: &str) -> Membership {
    let conn = Connection {
        id: registry.next_conn_id(),
        outbox: outbox(),
    };
    Membership::establish(Arc::clone(registry), room, Identity::from(name), conn)
        .await
        .unwrap()
        .0
}

#[tokio::test]
async fn watcher_follows_joins_and_leaves() {
    let registry = Arc::new(RoomRegistry::new());
    let feed = outbox();
    let mut sub = WatchSubscription::new(Arc::clone(&registry), registry.next_conn_id(), Arc::clone(&feed));
    sub.replace(vec!["r1".into()]).await;

    // room does not exist yet: no snapshot
    assert!(updates(&feed).is_empty());

    let alice = join(&registry, "r1", "alice").await;
    let bob = join(&registry, "r1", "bob").await;
    bob.leave().await;
    alice.leave().await;

    assert_eq!(
        updates(&feed),
        vec![
            RoomInfo::new("r1", 1),
            RoomInfo::new("r1", 2),
            RoomInfo::new("r1", 1),
            RoomInfo::new("r1", 0),
        ]
    );
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn subscribing_to_an_occupied_room_sends_a_snapshot() {
    let registry = Arc::new(RoomRegistry::new());
    let _a = join(&registry, "r1", "alice").await;
    let _b = join(&registry, "r1", "bob").await;

    let feed = outbox();
    let mut sub = WatchSubscription::new(Arc::clone(&registry), registry.next_conn_id(), Arc::clone(&feed));
    sub.replace(vec!["r1".into(), "empty".into()]).await;

    assert_eq!(updates(&feed), vec![RoomInfo::new("r1", 2)]);
}

#[tokio::test]
async fn other_rooms_are_not_reported() {
    let registry = Arc::new(RoomRegistry::new());
    let feed = outbox();
    let mut sub = WatchSubscription::new(Arc::clone(&registry), registry.next_conn_id(), Arc::clone(&feed));
    sub.replace(vec!["r1".into()]).await;

    let _x = join(&registry, "r2", "alice").await;
    assert!(updates(&feed).is_empty());
}

#[tokio::test]
async fn replacing_the_list_stops_old_rooms() {
    let registry = Arc::new(RoomRegistry::new());
    let feed = outbox();
    let conn = registry.next_conn_id();
    let mut sub = WatchSubscription::new(Arc::clone(&registry), conn, Arc::clone(&feed));
    sub.replace(vec!["r1".into(), "r2".into()]).await;
    assert_eq!(registry.watchers().watcher_count("r1"), 1);

    sub.replace(vec!["r2".into()]).await;
    assert_eq!(registry.watchers().watcher_count("r1"), 0);
    assert_eq!(registry.watchers().watcher_count("r2"), 1);

    let _a = join(&registry, "r1", "alice").await;
    let _b = join(&registry, "r2", "bob").await;
    assert_eq!(updates(&feed), vec![RoomInfo::new("r2", 1)]);
}

#[tokio::test]
async fn dropping_the_subscription_unregisters() {
    let registry = Arc::new(RoomRegistry::new());
    let feed = outbox();
    let mut sub = WatchSubscription::new(Arc::clone(&registry), registry.next_conn_id(), Arc::clone(&feed));
    sub.replace(vec!["r1".into(), "r2".into()]).await;
    assert_eq!(registry.watchers().watched_rooms(), 2);

    drop(sub);
    assert_eq!(registry.watchers().watched_rooms(), 0);

    let _a = join(&registry, "r1", "alice").await;
    assert!(updates(&feed).is_empty());
}

#[tokio::test]
async fn every_watcher_gets_the_update() {
    let registry = Arc::new(RoomRegistry::new());
    let feeds: Vec<_> = (0..3).map(|_| outbox()).collect();
    let mut subs = Vec::new();
    for feed in &feeds {
        let mut sub = WatchSubscription::new(Arc::clone(&registry), registry.next_conn_id(), Arc::clone(feed));
        sub.replace(vec!["r1".into()]).await;
        subs.push(sub);
    }

    let _a = join(&registry, "r1", "alice").await;
    for feed in &feeds {
        assert_eq!(updates(feed), vec![RoomInfo::new("r1", 1)]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn counts_stay_monotonic_per_join_order_under_churn() {
    let registry = Arc::new(RoomRegistry::new());
    let feed = outbox();
    let mut sub = WatchSubscription::new(Arc::clone(&registry), registry.next_conn_id(), Arc::clone(&feed));
    sub.replace(vec!["busy".into()]).await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            let m = join(&registry, "busy", &format!("p{i}")).await;
            tokio::task::yield_now().await;
            m.leave().await;
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    // every update differs from the previous one by exactly one member
    let counts: Vec<usize> = updates(&feed).iter().map(|u| u.user_count).collect();
    assert_eq!(counts.len(), 16);
    let mut prev = 0usize;
    for c in &counts {
        assert_eq!(c.abs_diff(prev), 1, "{counts:?}");
        prev = *c;
    }
    assert_eq!(prev, 0);
}
