//! Tests for the WebSocket snapshot push.
//!
//! The frame-building tests exercise `snapshot_push` directly, without
//! performing any HTTP upgrades. The final test runs the real server on
//! an ephemeral port and drives a live WebSocket client through
//! `/api/v1/ws`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;

use postmap_api::config::ServerConfig;
use postmap_api::router::build_app_router;
use postmap_api::state::AppState;
use postmap_api::ws::snapshot_push;
use postmap_core::area::{AreaStatus, Geometry};
use postmap_core::types::UserRef;
use postmap_events::{ChangeEvent, ChangeKind, EventBus};
use postmap_store::areas::{AreaStore, CreateArea};
use postmap_store::{DocumentStore, MemoryStore, AREAS_COLLECTION};

fn triangle() -> Geometry {
    Geometry::polygon(vec![[35.0, 139.0], [35.1, 139.0], [35.0, 139.1]])
}

fn tester() -> UserRef {
    UserRef {
        uid: "uid-1".into(),
        display_name: "Tester".into(),
        photo_url: String::new(),
    }
}

async fn seed_area(store: &MemoryStore, memo: &str) -> String {
    let area = AreaStore::create(
        store,
        CreateArea {
            geometry: triangle(),
            status: AreaStatus::default(),
            memo: memo.to_string(),
            planned_count: None,
        },
        tester(),
    )
    .await
    .unwrap();
    area.id
}

// ---------------------------------------------------------------------------
// Test: a frame carries every document in the affected collection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn frame_carries_full_collection_snapshot() {
    let store = MemoryStore::new();
    let id_a = seed_area(&store, "north block").await;
    let id_b = seed_area(&store, "south block").await;

    let push = snapshot_push(
        &store,
        ChangeEvent::new(AREAS_COLLECTION, ChangeKind::Created, vec![id_b.clone()]),
    )
    .await
    .unwrap();

    assert_eq!(push.documents.len(), 2);
    let ids: Vec<&str> = push.documents.iter().map(|d| d.id.as_str()).collect();
    assert!(ids.contains(&id_a.as_str()));
    assert!(ids.contains(&id_b.as_str()));

    // The serialized frame flattens the event next to the documents.
    let json: Value = serde_json::from_str(&serde_json::to_string(&push).unwrap()).unwrap();
    assert_eq!(json["collection"], AREAS_COLLECTION);
    assert_eq!(json["kind"], "created");
    assert_eq!(json["ids"], serde_json::json!([id_b]));
    assert_eq!(json["documents"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Test: an empty collection snapshots to an empty document list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_collection_snapshots_to_empty_list() {
    let store = MemoryStore::new();

    let push = snapshot_push(&store, ChangeEvent::replaced(AREAS_COLLECTION))
        .await
        .unwrap();

    assert!(push.documents.is_empty());
    let json: Value = serde_json::from_str(&serde_json::to_string(&push).unwrap()).unwrap();
    assert_eq!(json["kind"], "replaced");
    assert_eq!(json["documents"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Test: a bus subscriber sees the event that feeds the frame
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bus_event_feeds_the_frame() {
    let store = MemoryStore::new();
    let id = seed_area(&store, "east block").await;

    let bus = EventBus::default();
    let mut rx = bus.subscribe();
    bus.publish(ChangeEvent::new(
        AREAS_COLLECTION,
        ChangeKind::Updated,
        vec![id.clone()],
    ));

    let event = rx.recv().await.unwrap();
    let push = snapshot_push(&store, event).await.unwrap();
    assert_eq!(push.documents.len(), 1);
    assert_eq!(push.documents[0].id, id);
}

// ---------------------------------------------------------------------------
// Test: a live client on /api/v1/ws receives the pushed snapshot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn live_client_receives_snapshot_frame() {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::default());
    let config: ServerConfig = common::test_config();
    let state = AppState {
        store: Arc::clone(&store) as Arc<dyn DocumentStore>,
        config: Arc::new(config.clone()),
        bus: Arc::clone(&bus),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (mut socket, _response) =
        tokio_tungstenite::connect_async(format!("ws://{addr}/api/v1/ws"))
            .await
            .unwrap();

    // The server subscribes after completing the upgrade; give it a
    // moment before publishing.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let id = seed_area(&store, "west block").await;
    bus.publish(ChangeEvent::new(
        AREAS_COLLECTION,
        ChangeKind::Created,
        vec![id.clone()],
    ));

    let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("no frame within 5s")
        .expect("socket closed")
        .expect("socket error");
    let text = frame.into_text().unwrap();
    let json: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(json["collection"], AREAS_COLLECTION);
    assert_eq!(json["kind"], "created");
    assert_eq!(json["ids"], serde_json::json!([id]));
    let documents = json["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["id"], id.as_str());
    assert_eq!(documents[0]["data"]["memo"], "west block");
}
