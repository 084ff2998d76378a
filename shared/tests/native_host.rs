use std::sync::Arc;
use std::time::Duration;

use shared::capabilities::{Fix, LocationResponse};
use shared::host::{inbox, Host};
use shared::persistence::{MemoryStore, SqliteStore};
use shared::{CoreConfig, CoreError, Event, UnixTimeMs, ViewModel, WaypointId};
use tokio::sync::broadcast;

fn fix(latitude: f64, longitude: f64) -> LocationResponse {
    LocationResponse::Fix(Fix {
        latitude,
        longitude,
        accuracy_m: None,
        timestamp: UnixTimeMs(1),
    })
}

async fn wait_for<F>(views: &mut broadcast::Receiver<ViewModel>, predicate: F) -> ViewModel
where
    F: Fn(&ViewModel) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let view = views.recv().await.expect("view channel closed");
            if predicate(&view) {
                return view;
            }
        }
    })
    .await
    .expect("timed out waiting for view")
}

#[tokio::test]
async fn sqlite_round_trip_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("waypoints.db");

    {
        let mut host = Host::new(SqliteStore::open(&path).unwrap());
        host.start(CoreConfig::default()).await.unwrap();
        host.dispatch(Event::AddWaypoint {
            latitude: 51.5,
            longitude: -0.1,
        })
        .await;
        host.dispatch(Event::AddWaypoint {
            latitude: 48.85,
            longitude: 2.35,
        })
        .await;
        let id = WaypointId::new(host.view().pins[1].id.clone());
        host.dispatch(Event::SaveEdit {
            id,
            name: "Paris".into(),
            notes: "hotel".into(),
        })
        .await;
    }

    let mut host = Host::new(SqliteStore::open(&path).unwrap());
    host.start(CoreConfig::default()).await.unwrap();
    let view = host.view();

    assert_eq!(view.waypoint_count, 2);
    assert!(view.hint.is_none());
    assert_eq!(view.pins[0].latitude, 51.5);

    let paris = WaypointId::new(view.pins[1].id.clone());
    host.dispatch(Event::SelectWaypoint { id: Some(paris) }).await;
    let card = host.view().selected.unwrap();
    assert_eq!(card.name, "Paris");
    assert_eq!(card.notes, "hotel");
}

#[tokio::test]
async fn legacy_records_without_notes_load() {
    let json = r#"[{"id":"old-1","name":"Trailhead","latitude":46.5,"longitude":7.9,"timestamp":1600000000000}]"#;
    let mut host = Host::new(MemoryStore::with_slot("waypoints_json", json));
    host.start(CoreConfig::default()).await.unwrap();

    host.dispatch(Event::SelectWaypoint {
        id: Some(WaypointId::new("old-1")),
    })
    .await;
    let card = host.view().selected.unwrap();
    assert_eq!(card.name, "Trailhead");
    assert_eq!(card.notes, "");
}

#[tokio::test]
async fn corrupt_slot_reads_as_empty() {
    let mut host = Host::new(MemoryStore::with_slot("waypoints_json", "not json at all"));
    host.start(CoreConfig::default()).await.unwrap();

    let view = host.view();
    assert_eq!(view.waypoint_count, 0);
    assert!(view.hint.is_some());
}

#[tokio::test]
async fn write_failure_keeps_session_state() {
    let store = Arc::new(MemoryStore::new());
    store.set_fail_writes(true);

    let mut host = Host::new(Arc::clone(&store));
    host.start(CoreConfig::default()).await.unwrap();
    host.dispatch(Event::AddWaypoint {
        latitude: 1.0,
        longitude: 2.0,
    })
    .await;

    assert_eq!(host.view().waypoint_count, 1);
    assert_eq!(store.write_count(), 0);
    assert_eq!(store.snapshot("waypoints_json").await, None);

    store.set_fail_writes(false);
    host.dispatch(Event::AddWaypoint {
        latitude: 3.0,
        longitude: 4.0,
    })
    .await;
    assert_eq!(store.write_count(), 1);
    let saved = shared::persistence::decode_waypoints(
        &store.snapshot("waypoints_json").await.unwrap(),
    );
    assert_eq!(saved.len(), 2);
}

#[tokio::test]
async fn custom_storage_key_is_used() {
    let store = Arc::new(MemoryStore::new());
    let mut host = Host::new(Arc::clone(&store));
    host.start(CoreConfig {
        storage_key: "waypoints_v2".into(),
        ..CoreConfig::default()
    })
    .await
    .unwrap();
    host.dispatch(Event::AddWaypoint {
        latitude: 1.0,
        longitude: 2.0,
    })
    .await;

    assert!(store.snapshot("waypoints_v2").await.is_some());
    assert!(store.snapshot("waypoints_json").await.is_none());
}

#[tokio::test]
async fn queued_commands_and_fixes_are_broadcast_in_order() {
    let host = Host::new(MemoryStore::new());
    let mut views = host.subscribe();
    let (handle, rx) = inbox(32);
    let task = tokio::spawn(host.run(rx));

    handle.send(Event::Initialize).await.unwrap();
    handle
        .send(Event::LocationPermissionResult {
            fine: true,
            coarse: true,
        })
        .await
        .unwrap();
    handle.push_location(fix(10.0, 20.0)).await.unwrap();

    let view = wait_for(&mut views, |v| v.location_enabled).await;
    assert!(view.recenter.requested);
    assert_eq!(view.header.status, "10.00000, 20.00000");

    handle.send(Event::RecenterHandled).await.unwrap();
    handle
        .send(Event::AddWaypoint {
            latitude: 10.0,
            longitude: 20.0,
        })
        .await
        .unwrap();

    let view = wait_for(&mut views, |v| v.waypoint_count == 1).await;
    assert!(!view.recenter.requested);
    assert!(view.hint.is_none());

    let id = WaypointId::new(view.pins[0].id.clone());
    handle.send(Event::SelectWaypoint { id: Some(id) }).await.unwrap();
    let view = wait_for(&mut views, |v| v.selected.is_some()).await;
    assert_eq!(
        view.selected.unwrap().distance.as_deref(),
        Some("0 m away")
    );

    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn handle_reports_closed_host() {
    let (handle, rx) = inbox(1);
    drop(rx);
    assert!(matches!(
        handle.send(Event::Initialize).await,
        Err(CoreError::HostClosed)
    ));
}
