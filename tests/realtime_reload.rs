mod common;

use std::time::Duration;

use common::{event_on, insert_change, make_services, sample_trip, update_change, MockGateway};
use shiori_sync::application::ports::local_store::{MetaStore, MutationQueue};
use shiori_sync::domain::entities::EventPatch;
use shiori_sync::domain::value_objects::{meta, EventId, SyncPhase};
use shiori_sync::shared::AppError;

#[tokio::test]
async fn setting_current_trip_swaps_event_subscription() {
    let gateway = MockGateway::new();
    let (storage, _sync, store) = make_services(gateway.clone()).await;

    let kyoto = sample_trip("Kyoto");
    let nara = sample_trip("Nara");
    storage.create_trip(kyoto.clone()).await.unwrap();
    storage.create_trip(nara.clone()).await.unwrap();

    storage.set_current_trip(Some(kyoto.id.clone())).await.unwrap();
    assert_eq!(gateway.subscriber_count(), 1);
    assert_eq!(
        store.get_meta(meta::CURRENT_TRIP_ID).await.unwrap(),
        Some(kyoto.id.to_string())
    );

    storage.set_current_trip(Some(nara.id.clone())).await.unwrap();
    assert_eq!(gateway.subscriber_count(), 2);
    assert_eq!(
        store.get_meta(meta::CURRENT_TRIP_ID).await.unwrap(),
        Some(nara.id.to_string())
    );

    // 同じ旅行への切り替えは何もしない
    storage.set_current_trip(Some(nara.id.clone())).await.unwrap();
    assert_eq!(gateway.subscriber_count(), 2);

    storage.set_current_trip(None).await.unwrap();
    assert_eq!(store.get_meta(meta::CURRENT_TRIP_ID).await.unwrap(), None);
}

#[tokio::test]
async fn remote_change_reloads_whole_collection() {
    let gateway = MockGateway::new();
    let (storage, _sync, _store) = make_services(gateway.clone()).await;

    let trip = sample_trip("Kyoto");
    storage.create_trip(trip.clone()).await.unwrap();
    storage.set_current_trip(Some(trip.id.clone())).await.unwrap();

    storage
        .create_event(event_on(&trip.id, "Temple", 0, 0))
        .await
        .unwrap();

    // 別クライアントがリモートに直接イベントを足した状況
    let foreign = event_on(&trip.id, "Tea house", 0, 1);
    gateway.seed_event(foreign.clone());
    gateway.push_event_change(insert_change(&foreign));

    // 通知は購読タスク経由で非同期に適用される
    let mut titles: Vec<String> = Vec::new();
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let events = storage.get_events(&trip.id).await.unwrap();
        if events.len() == 2 {
            titles = events.into_iter().map(|e| e.title).collect();
            break;
        }
    }
    assert_eq!(titles, vec!["Temple".to_string(), "Tea house".to_string()]);
    assert_eq!(storage.event_phase(&foreign.id).await, Some(SyncPhase::Confirmed));
}

#[tokio::test]
async fn remote_truth_overwrites_optimistic_state() {
    let gateway = MockGateway::new();
    let (storage, _sync, _store) = make_services(gateway.clone()).await;

    let trip = sample_trip("Kyoto");
    storage.create_trip(trip.clone()).await.unwrap();
    storage.set_current_trip(Some(trip.id.clone())).await.unwrap();

    let event = storage
        .create_event(event_on(&trip.id, "Temple", 0, 0))
        .await
        .unwrap();

    // 別クライアントが同じ行を書き換えた
    let mut foreign = event.clone();
    foreign.title = "Temple (guided tour)".to_string();
    foreign.touch();
    gateway.seed_event(foreign.clone());

    storage.handle_remote_change(update_change(&foreign)).await;

    let events = storage.get_events(&trip.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Temple (guided tour)");
    assert_eq!(storage.event_phase(&event.id).await, Some(SyncPhase::Confirmed));
}

#[tokio::test]
async fn validation_rejection_rolls_back_optimistic_update() {
    let gateway = MockGateway::new();
    let (storage, _sync, _store) = make_services(gateway.clone()).await;

    let trip = sample_trip("Kyoto");
    storage.create_trip(trip.clone()).await.unwrap();
    storage.set_current_trip(Some(trip.id.clone())).await.unwrap();

    let event = storage
        .create_event(event_on(&trip.id, "Temple", 0, 0))
        .await
        .unwrap();

    gateway.fail_next_write("title rejected");
    let patch = EventPatch {
        title: Some("Temple!!!".to_string()),
        ..EventPatch::default()
    };
    let result = storage.update_event(&event.id, patch).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // 楽観的更新は巻き戻され、元の行が確定状態で残る
    let events = storage.get_events(&trip.id).await.unwrap();
    assert_eq!(events[0].title, "Temple");
    assert_eq!(storage.event_phase(&event.id).await, Some(SyncPhase::Confirmed));

    // リモート側も古いタイトルのまま
    assert_eq!(gateway.remote_event(&event.id).unwrap().title, "Temple");
}

#[tokio::test]
async fn deleting_unknown_event_is_silently_ignored() {
    let gateway = MockGateway::offline();
    let (storage, _sync, store) = make_services(gateway).await;

    let ghost = EventId::generate();
    storage.delete_event(&ghost).await.unwrap();

    assert_eq!(store.pending_mutation_count().await.unwrap(), 0);
}
