#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use shiori_sync::application::ports::local_store::LocalStore;
use shiori_sync::application::ports::remote_gateway::{
    ChangeCallback, RealtimeSubscription, RemoteChange, RemoteChangeType, RemoteGateway,
};
use shiori_sync::application::services::{StorageService, SyncService};
use shiori_sync::domain::entities::{ItineraryEvent, Trip, TripDocument};
use shiori_sync::domain::value_objects::{
    DayOffset, DocumentId, EventCategory, EventId, TripId,
};
use shiori_sync::domain::SessionContext;
use shiori_sync::infrastructure::cache::PlaceDetailsCache;
use shiori_sync::infrastructure::database::{ConnectionPool, SqliteLocalStore};
use shiori_sync::shared::config::SyncConfig;
use shiori_sync::shared::AppError;

/// インメモリのリモート。到達性の切り替え、書き込み失敗の注入、
/// realtime通知の手動発火ができる。
pub struct MockGateway {
    online: AtomicBool,
    trips: Mutex<HashMap<String, Trip>>,
    events: Mutex<HashMap<String, ItineraryEvent>>,
    documents: Mutex<HashMap<String, TripDocument>>,
    calls: Mutex<Vec<String>>,
    fail_next_write: Mutex<Option<String>>,
    event_callbacks: Mutex<Vec<ChangeCallback>>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            online: AtomicBool::new(true),
            trips: Mutex::new(HashMap::new()),
            events: Mutex::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_next_write: Mutex::new(None),
            event_callbacks: Mutex::new(Vec::new()),
        })
    }

    pub fn offline() -> Arc<Self> {
        let gateway = Self::new();
        gateway.set_online(false);
        gateway
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// 次の書き込み1回をバリデーション拒否にする
    pub fn fail_next_write(&self, message: &str) {
        *self.fail_next_write.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn seed_trip(&self, trip: Trip) {
        self.trips
            .lock()
            .unwrap()
            .insert(trip.id.to_string(), trip);
    }

    pub fn seed_event(&self, event: ItineraryEvent) {
        self.events
            .lock()
            .unwrap()
            .insert(event.id.to_string(), event);
    }

    pub fn remote_trip(&self, id: &TripId) -> Option<Trip> {
        self.trips.lock().unwrap().get(id.as_str()).cloned()
    }

    pub fn remote_event(&self, id: &EventId) -> Option<ItineraryEvent> {
        self.events.lock().unwrap().get(id.as_str()).cloned()
    }

    pub fn remote_event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.event_callbacks.lock().unwrap().len()
    }

    /// 購読者全員にrealtime変更を届ける
    pub fn push_event_change(&self, change: RemoteChange) {
        let callbacks: Vec<ChangeCallback> =
            self.event_callbacks.lock().unwrap().iter().cloned().collect();
        for callback in callbacks {
            callback(change.clone());
        }
    }

    fn gate(&self, label: &str) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(label.to_string());
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::Connectivity("mock gateway unreachable".to_string()))
        }
    }

    fn take_write_failure(&self) -> Option<String> {
        self.fail_next_write.lock().unwrap().take()
    }
}

struct MockSubscription {
    active: Arc<AtomicBool>,
}

impl RealtimeSubscription for MockSubscription {
    fn unsubscribe(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn check_connection(&self) -> bool {
        self.calls.lock().unwrap().push("check_connection".to_string());
        self.online.load(Ordering::SeqCst)
    }

    async fn fetch_trip(&self, id: &TripId) -> Result<Option<Trip>, AppError> {
        self.gate(&format!("fetch_trip {id}"))?;
        Ok(self.trips.lock().unwrap().get(id.as_str()).cloned())
    }

    async fn fetch_trips(&self) -> Result<Vec<Trip>, AppError> {
        self.gate("fetch_trips")?;
        let mut trips: Vec<Trip> = self.trips.lock().unwrap().values().cloned().collect();
        trips.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(trips)
    }

    async fn insert_trip(&self, trip: &Trip) -> Result<Trip, AppError> {
        self.gate(&format!("insert_trip {}", trip.id))?;
        if let Some(message) = self.take_write_failure() {
            return Err(AppError::Validation(message));
        }
        self.trips
            .lock()
            .unwrap()
            .insert(trip.id.to_string(), trip.clone());
        Ok(trip.clone())
    }

    async fn update_trip(&self, trip: &Trip) -> Result<Trip, AppError> {
        self.gate(&format!("update_trip {}", trip.id))?;
        if let Some(message) = self.take_write_failure() {
            return Err(AppError::Validation(message));
        }
        let mut trips = self.trips.lock().unwrap();
        if !trips.contains_key(trip.id.as_str()) {
            return Err(AppError::NotFound(format!("trip {}", trip.id)));
        }
        trips.insert(trip.id.to_string(), trip.clone());
        Ok(trip.clone())
    }

    async fn delete_trip(&self, id: &TripId) -> Result<(), AppError> {
        self.gate(&format!("delete_trip {id}"))?;
        self.trips.lock().unwrap().remove(id.as_str());
        Ok(())
    }

    async fn fetch_event(&self, id: &EventId) -> Result<Option<ItineraryEvent>, AppError> {
        self.gate(&format!("fetch_event {id}"))?;
        Ok(self.events.lock().unwrap().get(id.as_str()).cloned())
    }

    async fn fetch_events(&self, trip_id: &TripId) -> Result<Vec<ItineraryEvent>, AppError> {
        self.gate(&format!("fetch_events {trip_id}"))?;
        let mut events: Vec<ItineraryEvent> = self
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|event| &event.trip_id == trip_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.day
                .value()
                .cmp(&b.day.value())
                .then(a.sort_order.cmp(&b.sort_order))
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(events)
    }

    async fn insert_event(&self, event: &ItineraryEvent) -> Result<ItineraryEvent, AppError> {
        self.gate(&format!("insert_event {}", event.id))?;
        if let Some(message) = self.take_write_failure() {
            return Err(AppError::Validation(message));
        }
        self.events
            .lock()
            .unwrap()
            .insert(event.id.to_string(), event.clone());
        Ok(event.clone())
    }

    async fn update_event(&self, event: &ItineraryEvent) -> Result<ItineraryEvent, AppError> {
        self.gate(&format!("update_event {}", event.id))?;
        if let Some(message) = self.take_write_failure() {
            return Err(AppError::Validation(message));
        }
        let mut events = self.events.lock().unwrap();
        if !events.contains_key(event.id.as_str()) {
            return Err(AppError::NotFound(format!("event {}", event.id)));
        }
        events.insert(event.id.to_string(), event.clone());
        Ok(event.clone())
    }

    async fn upsert_events(
        &self,
        events: &[ItineraryEvent],
    ) -> Result<Vec<ItineraryEvent>, AppError> {
        self.gate(&format!("upsert_events x{}", events.len()))?;
        if let Some(message) = self.take_write_failure() {
            return Err(AppError::Validation(message));
        }
        let mut map = self.events.lock().unwrap();
        for event in events {
            map.insert(event.id.to_string(), event.clone());
        }
        Ok(events.to_vec())
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), AppError> {
        self.gate(&format!("delete_event {id}"))?;
        self.events.lock().unwrap().remove(id.as_str());
        Ok(())
    }

    async fn fetch_documents(&self, trip_id: &TripId) -> Result<Vec<TripDocument>, AppError> {
        self.gate(&format!("fetch_documents {trip_id}"))?;
        let mut documents: Vec<TripDocument> = self
            .documents
            .lock()
            .unwrap()
            .values()
            .filter(|document| &document.trip_id == trip_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(documents)
    }

    async fn insert_document(&self, document: &TripDocument) -> Result<TripDocument, AppError> {
        self.gate(&format!("insert_document {}", document.id))?;
        if let Some(message) = self.take_write_failure() {
            return Err(AppError::Validation(message));
        }
        self.documents
            .lock()
            .unwrap()
            .insert(document.id.to_string(), document.clone());
        Ok(document.clone())
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<(), AppError> {
        self.gate(&format!("delete_document {id}"))?;
        self.documents.lock().unwrap().remove(id.as_str());
        Ok(())
    }

    async fn subscribe_trip_changes(
        &self,
        _callback: ChangeCallback,
    ) -> Result<Box<dyn RealtimeSubscription>, AppError> {
        self.gate("subscribe_trip_changes")?;
        Ok(Box::new(MockSubscription {
            active: Arc::new(AtomicBool::new(true)),
        }))
    }

    async fn subscribe_event_changes(
        &self,
        trip_id: &TripId,
        callback: ChangeCallback,
    ) -> Result<Box<dyn RealtimeSubscription>, AppError> {
        self.gate(&format!("subscribe_event_changes {trip_id}"))?;
        self.event_callbacks.lock().unwrap().push(callback);
        Ok(Box::new(MockSubscription {
            active: Arc::new(AtomicBool::new(true)),
        }))
    }
}

pub fn sync_config() -> SyncConfig {
    SyncConfig {
        probe_timeout: 1,
        heartbeat_interval: 30,
        conflict_detection: false,
    }
}

pub async fn memory_store() -> Arc<SqliteLocalStore> {
    let pool = ConnectionPool::from_memory().await.unwrap();
    pool.migrate().await.unwrap();
    Arc::new(SqliteLocalStore::new(pool))
}

/// ストア・同期・ファサードを一式組み立てる。initialize済みで返す。
pub async fn make_services(
    gateway: Arc<MockGateway>,
) -> (Arc<StorageService>, Arc<SyncService>, Arc<SqliteLocalStore>) {
    let store = memory_store().await;
    let store_dyn: Arc<dyn LocalStore> = store.clone();
    let gateway_dyn: Arc<dyn RemoteGateway> = gateway;

    let sync = Arc::new(SyncService::new(
        store_dyn.clone(),
        gateway_dyn.clone(),
        &sync_config(),
    ));
    sync.initialize().await.unwrap();

    let storage = Arc::new(StorageService::new(
        store_dyn,
        gateway_dyn,
        sync.clone(),
        SessionContext::default(),
        Arc::new(PlaceDetailsCache::new(16)),
    ));
    (storage, sync, store)
}

pub fn sample_trip(name: &str) -> Trip {
    Trip::new(
        name.to_string(),
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        3,
    )
}

pub fn event_on(trip_id: &TripId, title: &str, day: i32, sort_order: i32) -> ItineraryEvent {
    ItineraryEvent::new(
        trip_id.clone(),
        EventCategory::Play,
        title.to_string(),
        DayOffset::new(day).unwrap(),
    )
    .with_sort_order(sort_order)
}

pub fn insert_change(event: &ItineraryEvent) -> RemoteChange {
    RemoteChange {
        event_type: RemoteChangeType::Insert,
        new: Some(serde_json::to_value(event).unwrap()),
        old: None,
    }
}

pub fn update_change(event: &ItineraryEvent) -> RemoteChange {
    RemoteChange {
        event_type: RemoteChangeType::Update,
        new: Some(serde_json::to_value(event).unwrap()),
        old: None,
    }
}
