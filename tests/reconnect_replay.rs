mod common;

use common::{event_on, make_services, sample_trip, MockGateway};
use shiori_sync::application::ports::local_store::MutationQueue;
use shiori_sync::domain::entities::EventPatch;
use shiori_sync::domain::value_objects::SyncState;
use shiori_sync::shared::AppError;

#[tokio::test]
async fn queued_writes_replay_in_insertion_order_on_reconnect() {
    let gateway = MockGateway::offline();
    let (storage, sync, store) = make_services(gateway.clone()).await;

    let trip = sample_trip("Kyoto");
    storage.create_trip(trip.clone()).await.unwrap();

    let temple = storage
        .create_event(event_on(&trip.id, "Temple", 0, 0))
        .await
        .unwrap();
    let market = storage
        .create_event(event_on(&trip.id, "Market", 0, 1))
        .await
        .unwrap();

    let patch = EventPatch {
        title: Some("Temple at dawn".to_string()),
        ..EventPatch::default()
    };
    storage.update_event(&temple.id, patch).await.unwrap();
    storage.delete_event(&market.id).await.unwrap();

    assert_eq!(store.pending_mutation_count().await.unwrap(), 5);

    // 回線復帰のヒント。プローブが通ればキューが排出される。
    gateway.set_online(true);
    sync.handle_connectivity_hint(true).await;

    assert_eq!(sync.state().await, SyncState::Online);
    assert_eq!(store.pending_mutation_count().await.unwrap(), 0);

    // 受付順どおりに再生される
    let writes: Vec<String> = gateway
        .calls()
        .into_iter()
        .filter(|c| {
            c.starts_with("insert_") || c.starts_with("upsert_") || c.starts_with("delete_")
        })
        .collect();
    assert_eq!(
        writes,
        vec![
            format!("insert_trip {}", trip.id),
            format!("insert_event {}", temple.id),
            format!("insert_event {}", market.id),
            "upsert_events x1".to_string(),
            format!("delete_event {}", market.id),
        ]
    );

    // リモートの最終状態: 更新後のタイトル、削除済みイベントは無い
    let remote_temple = gateway.remote_event(&temple.id).unwrap();
    assert_eq!(remote_temple.title, "Temple at dawn");
    assert!(gateway.remote_event(&market.id).is_none());
    assert_eq!(gateway.remote_event_count(), 1);
    assert!(gateway.remote_trip(&trip.id).is_some());
}

#[tokio::test]
async fn rejected_mutation_is_dropped_and_rest_replays() {
    let gateway = MockGateway::offline();
    let (storage, sync, _store) = make_services(gateway.clone()).await;

    let trip = sample_trip("Nara");
    let first = storage
        .create_event(event_on(&trip.id, "Deer park", 0, 0))
        .await
        .unwrap();
    let second = storage
        .create_event(event_on(&trip.id, "Big Buddha", 0, 1))
        .await
        .unwrap();

    gateway.set_online(true);
    gateway.fail_next_write("row rejected");
    sync.handle_connectivity_hint(true).await;

    // 拒否された1件目は破棄され、2件目はリモートに到達している
    assert_eq!(sync.state().await, SyncState::Online);
    assert!(gateway.remote_event(&first.id).is_none());
    assert!(gateway.remote_event(&second.id).is_some());
}

#[tokio::test]
async fn manual_sync_requires_reachability() {
    let gateway = MockGateway::offline();
    let (storage, sync, store) = make_services(gateway.clone()).await;

    let trip = sample_trip("Kanazawa");
    storage.create_trip(trip.clone()).await.unwrap();

    let denied = storage.sync_now().await;
    assert!(matches!(denied, Err(AppError::Connectivity(_))));
    assert_eq!(sync.state().await, SyncState::Offline);

    gateway.set_online(true);
    let summary = storage.sync_now().await.unwrap();
    assert_eq!(summary.replayed, 1);
    assert_eq!(summary.remaining, 0);
    assert!(!summary.went_offline);

    assert_eq!(sync.state().await, SyncState::Online);
    assert_eq!(store.pending_mutation_count().await.unwrap(), 0);
    assert!(storage.last_sync_time().await.unwrap().is_some());
}

#[tokio::test]
async fn reconnect_hint_without_reachability_keeps_queue() {
    let gateway = MockGateway::offline();
    let (storage, sync, store) = make_services(gateway.clone()).await;

    let trip = sample_trip("Takayama");
    storage.create_trip(trip.clone()).await.unwrap();

    // 回線復帰のヒントがあってもプローブが通らなければOfflineのまま
    sync.handle_connectivity_hint(true).await;
    assert_eq!(sync.state().await, SyncState::Offline);
    assert_eq!(store.pending_mutation_count().await.unwrap(), 1);
    assert!(gateway.remote_trip(&trip.id).is_none());
}
