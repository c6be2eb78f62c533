use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::application::ports::connectivity::{Connectivity, ConnectivitySubscription};
use crate::application::ports::local_store::LocalStore;
use crate::application::ports::remote_gateway::{
    ChangeCallback, RealtimeSubscription, RemoteChange, RemoteGateway,
};
use crate::application::services::sync_service::{DrainSummary, SyncService, SyncStatus};
use crate::domain::entities::{
    collect_saved_places, merge_place_details, EventPatch, ItineraryEvent, PendingMutationDraft,
    PlaceDetails, SavedPlace, Trip, TripDocument, TripPatch,
};
use crate::domain::value_objects::{
    meta, DocumentId, EntityKind, EventId, MutationKind, SyncPhase, TripId,
};
use crate::domain::SessionContext;
use crate::infrastructure::cache::PlaceDetailsCache;
use crate::shared::error::AppError;

/// 現在の旅行のイベント一覧に対する権威スナップショット。
/// UIが最後に描画した値ではなく、常にこちらを読み書きの基準にする。
#[derive(Debug, Clone)]
pub struct EventsSnapshot {
    pub trip_id: TripId,
    entries: Vec<SnapshotEntry>,
}

/// スナップショット上の1イベントと、その楽観的更新の確定段階
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub event: ItineraryEvent,
    pub phase: SyncPhase,
}

impl EventsSnapshot {
    pub fn from_events(trip_id: TripId, events: &[ItineraryEvent], phase: SyncPhase) -> Self {
        Self {
            trip_id,
            entries: events
                .iter()
                .map(|event| SnapshotEntry {
                    event: event.clone(),
                    phase,
                })
                .collect(),
        }
    }

    pub fn get(&self, id: &EventId) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|entry| &entry.event.id == id)
    }

    pub fn phase_of(&self, id: &EventId) -> Option<SyncPhase> {
        self.get(id).map(|entry| entry.phase)
    }

    /// 同一IDがあれば行ごと置き換え、なければ末尾に足す
    pub fn upsert(&mut self, event: ItineraryEvent, phase: SyncPhase) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.event.id == event.id)
        {
            Some(entry) => {
                entry.event = event;
                entry.phase = phase;
            }
            None => self.entries.push(SnapshotEntry { event, phase }),
        }
    }

    pub fn remove(&mut self, id: &EventId) -> Option<SnapshotEntry> {
        let pos = self.entries.iter().position(|entry| &entry.event.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn replace_all(&mut self, events: &[ItineraryEvent], phase: SyncPhase) {
        self.entries = events
            .iter()
            .map(|event| SnapshotEntry {
                event: event.clone(),
                phase,
            })
            .collect();
    }

    /// ローカルストアと同じ整列（日オフセット→ソート順→作成時刻）で返す
    pub fn events(&self) -> Vec<ItineraryEvent> {
        let mut events: Vec<ItineraryEvent> =
            self.entries.iter().map(|entry| entry.event.clone()).collect();
        events.sort_by(|a, b| {
            a.day
                .value()
                .cmp(&b.day.value())
                .then(a.sort_order.cmp(&b.sort_order))
                .then(a.created_at.cmp(&b.created_at))
        });
        events
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// ストレージファサード。UI側はこれだけを相手にする。
///
/// 書き込みはSyncServiceの状態でルーティングされる:
/// Online/Syncingなら直接リモートへ、Offlineならローカル+キューへ。
/// リモート書き込みが接続断で落ちた場合はその場でローカル+キューに降格し、
/// 呼び出し元には成功を返す（楽観的更新は立ったまま、永続化は後回し）。
pub struct StorageService {
    store: Arc<dyn LocalStore>,
    gateway: Arc<dyn RemoteGateway>,
    sync: Arc<SyncService>,
    session: SessionContext,
    place_cache: Arc<PlaceDetailsCache>,
    snapshot: Arc<RwLock<Option<EventsSnapshot>>>,
    /// ファサード全体の書き込み直列化。awaitまたぎで保持して後続をFIFOで待たせる。
    write_gate: Arc<Mutex<()>>,
    event_subscription: Arc<StdMutex<Option<Box<dyn RealtimeSubscription>>>>,
    connectivity_subscription: Arc<StdMutex<Option<ConnectivitySubscription>>>,
}

impl StorageService {
    pub fn new(
        store: Arc<dyn LocalStore>,
        gateway: Arc<dyn RemoteGateway>,
        sync: Arc<SyncService>,
        session: SessionContext,
        place_cache: Arc<PlaceDetailsCache>,
    ) -> Self {
        Self {
            store,
            gateway,
            sync,
            session,
            place_cache,
            snapshot: Arc::new(RwLock::new(None)),
            write_gate: Arc::new(Mutex::new(())),
            event_subscription: Arc::new(StdMutex::new(None)),
            connectivity_subscription: Arc::new(StdMutex::new(None)),
        }
    }

    pub fn sync(&self) -> &Arc<SyncService> {
        &self.sync
    }

    // ---- trips ----

    pub async fn get_trip(&self, id: &TripId) -> Result<Option<Trip>, AppError> {
        self.load_trip_routed(id).await
    }

    pub async fn list_trips(&self) -> Result<Vec<Trip>, AppError> {
        if self.sync.routes_to_remote().await {
            match self.gateway.fetch_trips().await {
                Ok(trips) => return Ok(trips),
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    debug!("Falling back to local store for trip list");
                }
                Err(e) => return Err(e),
            }
        }
        self.store.list_trips().await
    }

    pub async fn create_trip(&self, trip: Trip) -> Result<Trip, AppError> {
        let _gate = self.write_gate.lock().await;

        if self.sync.routes_to_remote().await {
            match self.gateway.insert_trip(&trip).await {
                Ok(saved) => {
                    info!(trip_id = %saved.id, "Trip created remotely");
                    return Ok(saved);
                }
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    warn!(trip_id = %trip.id, "Trip create demoted to offline queue");
                }
                Err(e) => return Err(e),
            }
        }

        self.store.put_trip(&trip).await?;
        let draft = PendingMutationDraft::create(
            EntityKind::Trip,
            trip.id.to_string(),
            serde_json::to_value(&trip)?,
        );
        self.store.enqueue_mutation(draft).await?;
        info!(trip_id = %trip.id, "Trip created locally");
        Ok(trip)
    }

    pub async fn update_trip(&self, id: &TripId, patch: TripPatch) -> Result<Trip, AppError> {
        let _gate = self.write_gate.lock().await;

        let mut trip = self
            .load_trip_routed(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("trip {id}")))?;
        trip.apply_patch(patch);

        if self.sync.routes_to_remote().await {
            match self.gateway.update_trip(&trip).await {
                Ok(saved) => return Ok(saved),
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    warn!(trip_id = %id, "Trip update demoted to offline queue");
                }
                Err(e) => return Err(e),
            }
        }

        self.store.put_trip(&trip).await?;
        let draft = PendingMutationDraft::update(
            EntityKind::Trip,
            trip.id.to_string(),
            serde_json::to_value(&trip)?,
        );
        self.store.enqueue_mutation(draft).await?;
        Ok(trip)
    }

    pub async fn delete_trip(&self, id: &TripId) -> Result<(), AppError> {
        let _gate = self.write_gate.lock().await;

        if self.sync.routes_to_remote().await {
            match self.gateway.delete_trip(id).await {
                Ok(()) => {
                    info!(trip_id = %id, "Trip deleted remotely");
                    self.forget_trip_session(id).await?;
                    return Ok(());
                }
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    warn!(trip_id = %id, "Trip delete demoted to offline queue");
                }
                Err(e) => return Err(e),
            }
        }

        self.store.delete_trip(id).await?;
        let draft = PendingMutationDraft::delete(EntityKind::Trip, id.to_string());
        self.store.enqueue_mutation(draft).await?;
        self.forget_trip_session(id).await?;
        Ok(())
    }

    // ---- events ----

    /// 現在の旅行ならスナップショットを真実として返し、なければ取得して据える
    pub async fn get_events(&self, trip_id: &TripId) -> Result<Vec<ItineraryEvent>, AppError> {
        if let Some(events) = self.snapshot_events(trip_id).await {
            return Ok(events);
        }
        let events = self.load_events_routed(trip_id).await?;
        self.install_snapshot_if_current(trip_id, &events).await;
        Ok(events)
    }

    /// スナップショットを捨てて取り直す
    pub async fn refresh_events(&self, trip_id: &TripId) -> Result<Vec<ItineraryEvent>, AppError> {
        let events = self.load_events_routed(trip_id).await?;
        self.install_snapshot_if_current(trip_id, &events).await;
        Ok(events)
    }

    /// 指定日のイベント。日程未定（day=-1）はどの日にも現れない。
    pub async fn events_for_day(
        &self,
        trip_id: &TripId,
        day: u32,
    ) -> Result<Vec<ItineraryEvent>, AppError> {
        let events = self.get_events(trip_id).await?;
        Ok(events
            .into_iter()
            .filter(|event| event.day.index() == Some(day))
            .collect())
    }

    /// 「あとで行く」一覧。日程未定のイベントをplace_id単位でまとめ、
    /// 場所詳細はキャッシュ優先・埋め込みコピー補完でマージする。
    pub async fn saved_places(&self, trip_id: &TripId) -> Result<Vec<SavedPlace>, AppError> {
        let events = self.get_events(trip_id).await?;
        Ok(collect_saved_places(&events, |place_id| {
            self.place_cache.get(place_id.as_str())
        }))
    }

    pub async fn create_event(&self, event: ItineraryEvent) -> Result<ItineraryEvent, AppError> {
        let _gate = self.write_gate.lock().await;

        let tracked = self.ensure_snapshot(&event.trip_id).await?;
        if tracked {
            self.with_snapshot(&event.trip_id, |snap| {
                snap.upsert(event.clone(), SyncPhase::Pending);
            })
            .await;
        }

        if self.sync.routes_to_remote().await {
            match self.gateway.insert_event(&event).await {
                Ok(saved) => {
                    if tracked {
                        self.with_snapshot(&event.trip_id, |snap| {
                            snap.upsert(saved.clone(), SyncPhase::Confirmed);
                        })
                        .await;
                    }
                    info!(event_id = %saved.id, "Event created remotely");
                    return Ok(saved);
                }
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    warn!(event_id = %event.id, "Event create demoted to offline queue");
                }
                Err(e) => {
                    self.rollback_event(&event.trip_id, &event.id, None).await;
                    return Err(e);
                }
            }
        }

        if let Err(e) = self.queue_event_write(MutationKind::Create, &event).await {
            self.rollback_event(&event.trip_id, &event.id, None).await;
            return Err(e);
        }
        if tracked {
            self.with_snapshot(&event.trip_id, |snap| {
                snap.upsert(event.clone(), SyncPhase::Confirmed);
            })
            .await;
        }
        Ok(event)
    }

    pub async fn update_event(
        &self,
        id: &EventId,
        patch: EventPatch,
    ) -> Result<ItineraryEvent, AppError> {
        let _gate = self.write_gate.lock().await;

        // 呼び出し時点の値ではなく権威スナップショットを基準に読み書きする
        let current = match self.snapshot_entry(id).await {
            Some(entry) => entry.event,
            None => self
                .load_event_routed(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("event {id}")))?,
        };
        let tracked = self.ensure_snapshot(&current.trip_id).await?;

        let mut updated = current;
        updated.apply_patch(patch);

        let previous = if tracked {
            self.with_snapshot(&updated.trip_id, |snap| {
                let previous = snap.get(&updated.id).cloned();
                snap.upsert(updated.clone(), SyncPhase::Pending);
                previous
            })
            .await
            .flatten()
        } else {
            None
        };

        if self.sync.routes_to_remote().await {
            match self.gateway.update_event(&updated).await {
                Ok(saved) => {
                    if tracked {
                        self.with_snapshot(&updated.trip_id, |snap| {
                            snap.upsert(saved.clone(), SyncPhase::Confirmed);
                        })
                        .await;
                    }
                    return Ok(saved);
                }
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    warn!(event_id = %updated.id, "Event update demoted to offline queue");
                }
                Err(e) => {
                    self.rollback_event(&updated.trip_id, &updated.id, previous).await;
                    return Err(e);
                }
            }
        }

        if let Err(e) = self.queue_event_write(MutationKind::Update, &updated).await {
            self.rollback_event(&updated.trip_id, &updated.id, previous).await;
            return Err(e);
        }
        if tracked {
            self.with_snapshot(&updated.trip_id, |snap| {
                snap.upsert(updated.clone(), SyncPhase::Confirmed);
            })
            .await;
        }
        Ok(updated)
    }

    /// 旅行全体の並べ替えを一括で置き換える。eventsはその旅行の完全な新しい姿。
    pub async fn update_events(
        &self,
        trip_id: &TripId,
        events: Vec<ItineraryEvent>,
    ) -> Result<Vec<ItineraryEvent>, AppError> {
        let _gate = self.write_gate.lock().await;

        if let Some(stray) = events.iter().find(|event| &event.trip_id != trip_id) {
            return Err(AppError::Validation(format!(
                "event {} does not belong to trip {trip_id}",
                stray.id
            )));
        }

        let tracked = self.ensure_snapshot(trip_id).await?;
        let previous = if tracked {
            self.with_snapshot(trip_id, |snap| {
                let previous = snap.clone();
                snap.replace_all(&events, SyncPhase::Pending);
                previous
            })
            .await
        } else {
            None
        };

        if self.sync.routes_to_remote().await {
            match self.gateway.upsert_events(&events).await {
                Ok(saved) => {
                    if tracked {
                        self.with_snapshot(trip_id, |snap| {
                            snap.replace_all(&saved, SyncPhase::Confirmed);
                        })
                        .await;
                    }
                    info!(trip_id = %trip_id, count = saved.len(), "Events reordered remotely");
                    return Ok(saved);
                }
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    warn!(trip_id = %trip_id, "Batch update demoted to offline queue");
                }
                Err(e) => {
                    self.restore_snapshot(previous).await;
                    return Err(e);
                }
            }
        }

        if let Err(e) = self.queue_batch_update(trip_id, &events).await {
            self.restore_snapshot(previous).await;
            return Err(e);
        }
        if tracked {
            self.with_snapshot(trip_id, |snap| {
                snap.replace_all(&events, SyncPhase::Confirmed);
            })
            .await;
        }
        Ok(events)
    }

    pub async fn delete_event(&self, id: &EventId) -> Result<(), AppError> {
        let _gate = self.write_gate.lock().await;

        let current = match self.snapshot_entry(id).await {
            Some(entry) => Some(entry.event),
            None => self.load_event_routed(id).await?,
        };
        let current = match current {
            Some(event) => event,
            None => {
                debug!(event_id = %id, "Delete of unknown event ignored");
                return Ok(());
            }
        };

        let tracked = self.ensure_snapshot(&current.trip_id).await?;
        let previous = if tracked {
            self.with_snapshot(&current.trip_id, |snap| snap.remove(id))
                .await
                .flatten()
        } else {
            None
        };

        if self.sync.routes_to_remote().await {
            match self.gateway.delete_event(id).await {
                Ok(()) => {
                    info!(event_id = %id, "Event deleted remotely");
                    return Ok(());
                }
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    warn!(event_id = %id, "Event delete demoted to offline queue");
                }
                Err(e) => {
                    self.rollback_event(&current.trip_id, id, previous).await;
                    return Err(e);
                }
            }
        }

        if let Err(e) = self.queue_event_delete(&current).await {
            self.rollback_event(&current.trip_id, id, previous).await;
            return Err(e);
        }
        Ok(())
    }

    /// 楽観的更新の確定段階を覗く（現在の旅行のスナップショットにある場合のみ）
    pub async fn event_phase(&self, id: &EventId) -> Option<SyncPhase> {
        let guard = self.snapshot.read().await;
        guard.as_ref().and_then(|snap| snap.phase_of(id))
    }

    // ---- documents ----

    pub async fn get_documents(&self, trip_id: &TripId) -> Result<Vec<TripDocument>, AppError> {
        if self.sync.routes_to_remote().await {
            match self.gateway.fetch_documents(trip_id).await {
                Ok(documents) => return Ok(documents),
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    debug!("Falling back to local store for documents");
                }
                Err(e) => return Err(e),
            }
        }
        self.store.list_documents(trip_id).await
    }

    pub async fn create_document(
        &self,
        document: TripDocument,
    ) -> Result<TripDocument, AppError> {
        let _gate = self.write_gate.lock().await;

        if self.sync.routes_to_remote().await {
            match self.gateway.insert_document(&document).await {
                Ok(saved) => {
                    info!(document_id = %saved.id, "Document created remotely");
                    return Ok(saved);
                }
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    warn!(document_id = %document.id, "Document create demoted to offline queue");
                }
                Err(e) => return Err(e),
            }
        }

        self.store.put_document(&document).await?;
        let draft = PendingMutationDraft::create(
            EntityKind::Document,
            document.id.to_string(),
            serde_json::to_value(&document)?,
        );
        self.store.enqueue_mutation(draft).await?;
        Ok(document)
    }

    pub async fn delete_document(&self, id: &DocumentId) -> Result<(), AppError> {
        let _gate = self.write_gate.lock().await;

        if self.sync.routes_to_remote().await {
            match self.gateway.delete_document(id).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    warn!(document_id = %id, "Document delete demoted to offline queue");
                }
                Err(e) => return Err(e),
            }
        }

        self.store.delete_document(id).await?;
        let draft = PendingMutationDraft::delete(EntityKind::Document, id.to_string());
        self.store.enqueue_mutation(draft).await?;
        Ok(())
    }

    // ---- session / sync ----

    pub async fn current_trip_id(&self) -> Option<TripId> {
        self.session.current_trip().await
    }

    /// 開く旅行を切り替える。realtime購読も張り替え、選択はmetaに永続化する。
    pub async fn set_current_trip(&self, trip_id: Option<TripId>) -> Result<(), AppError> {
        let _gate = self.write_gate.lock().await;

        let previous = self.session.switch_trip(trip_id.clone()).await;
        if previous == trip_id {
            return Ok(());
        }
        match &trip_id {
            Some(id) => {
                self.store
                    .set_meta(meta::CURRENT_TRIP_ID, id.as_str())
                    .await?
            }
            None => self.store.delete_meta(meta::CURRENT_TRIP_ID).await?,
        }
        *self.snapshot.write().await = None;
        self.resubscribe_current_trip().await;
        info!(
            trip = trip_id.as_ref().map(|t| t.as_str()).unwrap_or("none"),
            "Current trip switched"
        );
        Ok(())
    }

    /// 前回セッションの「開いている旅行」をmetaから復元する
    pub async fn restore_session(&self) -> Result<(), AppError> {
        if let Some(raw) = self.store.get_meta(meta::CURRENT_TRIP_ID).await? {
            match TripId::new(raw) {
                Ok(trip_id) => {
                    debug!(trip_id = %trip_id, "Restoring current trip from meta");
                    self.session.switch_trip(Some(trip_id)).await;
                    self.resubscribe_current_trip().await;
                }
                Err(e) => warn!(error = %e, "Stored current trip id is invalid"),
            }
        }
        Ok(())
    }

    pub async fn last_sync_time(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        self.sync.last_sync_time().await
    }

    pub async fn sync_status(&self) -> Result<SyncStatus, AppError> {
        self.sync.status().await
    }

    /// 手動同期。プローブが通らなければConnectivityエラーで返す。
    pub async fn sync_now(&self) -> Result<DrainSummary, AppError> {
        if !self.gateway.check_connection().await {
            self.sync.note_connectivity_failure().await;
            return Err(AppError::Connectivity(
                "sync requested while the backend is unreachable".to_string(),
            ));
        }
        self.sync.drain().await
    }

    /// 外部フェッチで得た場所詳細を取り込む。既存キャッシュとはフィールド単位でマージする。
    pub fn cache_place_details(&self, details: PlaceDetails) {
        let existing = self.place_cache.get(details.place_id.as_str());
        if let Some(merged) = merge_place_details(Some(&details), existing.as_ref()) {
            self.place_cache.put(merged);
        }
    }

    // ---- realtime / connectivity wiring ----

    /// realtime変更の適用。リモートを権威として旅行全体を読み直し、
    /// 楽観的状態を上書きする。細粒度のマージはしない。
    pub async fn handle_remote_change(&self, change: RemoteChange) {
        let _gate = self.write_gate.lock().await;

        let trip_id = match self.session.current_trip().await {
            Some(trip_id) => trip_id,
            None => return,
        };
        debug!(
            event_type = change.event_type.as_str(),
            trip_id = %trip_id,
            "Applying remote change by full reload"
        );
        match self.gateway.fetch_events(&trip_id).await {
            Ok(events) => {
                let mut guard = self.snapshot.write().await;
                *guard = Some(EventsSnapshot::from_events(
                    trip_id.clone(),
                    &events,
                    SyncPhase::Confirmed,
                ));
            }
            Err(e) if e.is_connectivity() => {
                self.sync.note_connectivity_failure().await;
            }
            Err(e) => warn!(error = %e, "Full reload after remote change failed"),
        }
    }

    /// 現在の旅行のイベント変更購読を張り替える。古いハンドルは必ず解除する。
    pub async fn resubscribe_current_trip(&self) {
        if let Ok(mut guard) = self.event_subscription.lock() {
            if let Some(old) = guard.take() {
                old.unsubscribe();
            }
        }
        let trip_id = match self.session.current_trip().await {
            Some(trip_id) => trip_id,
            None => return,
        };

        let service = self.clone();
        let callback: ChangeCallback = Arc::new(move |change| {
            let service = service.clone();
            tokio::spawn(async move {
                service.handle_remote_change(change).await;
            });
        });

        match self.gateway.subscribe_event_changes(&trip_id, callback).await {
            Ok(handle) => {
                debug!(trip_id = %trip_id, "Realtime subscription established");
                if let Ok(mut guard) = self.event_subscription.lock() {
                    *guard = Some(handle);
                }
            }
            Err(e) => {
                debug!(error = %e, "Realtime subscription unavailable");
            }
        }
    }

    /// Connectivity Monitorへの購読を張る。エッジごとにSyncServiceへ流し、
    /// ハンドルは自分で保持して解除漏れを防ぐ。
    pub fn attach_connectivity(&self, monitor: &dyn Connectivity) {
        let service = self.clone();
        let subscription = monitor.subscribe(Box::new(move |online| {
            let service = service.clone();
            tokio::spawn(async move {
                service.sync.handle_connectivity_hint(online).await;
                if online && service.sync.routes_to_remote().await {
                    service.resubscribe_current_trip().await;
                }
            });
        }));
        if let Ok(mut guard) = self.connectivity_subscription.lock() {
            *guard = Some(subscription);
        }
    }

    /// セッション終了時の後始末。購読を解除する。
    pub fn shutdown(&self) {
        if let Ok(mut guard) = self.event_subscription.lock() {
            if let Some(subscription) = guard.take() {
                subscription.unsubscribe();
            }
        }
        if let Ok(mut guard) = self.connectivity_subscription.lock() {
            if let Some(subscription) = guard.take() {
                subscription.unsubscribe();
            }
        }
    }

    // ---- internals ----

    async fn load_trip_routed(&self, id: &TripId) -> Result<Option<Trip>, AppError> {
        if self.sync.routes_to_remote().await {
            match self.gateway.fetch_trip(id).await {
                Ok(trip) => return Ok(trip),
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    debug!("Falling back to local store for trip read");
                }
                Err(e) => return Err(e),
            }
        }
        self.store.get_trip(id).await
    }

    async fn load_event_routed(&self, id: &EventId) -> Result<Option<ItineraryEvent>, AppError> {
        if self.sync.routes_to_remote().await {
            match self.gateway.fetch_event(id).await {
                Ok(event) => return Ok(event),
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    debug!("Falling back to local store for event read");
                }
                Err(e) => return Err(e),
            }
        }
        self.store.get_event(id).await
    }

    async fn load_events_routed(&self, trip_id: &TripId) -> Result<Vec<ItineraryEvent>, AppError> {
        if self.sync.routes_to_remote().await {
            match self.gateway.fetch_events(trip_id).await {
                Ok(events) => return Ok(events),
                Err(e) if e.is_connectivity() => {
                    self.sync.note_connectivity_failure().await;
                    debug!("Falling back to local store for event list");
                }
                Err(e) => return Err(e),
            }
        }
        self.store.list_events(trip_id).await
    }

    async fn snapshot_events(&self, trip_id: &TripId) -> Option<Vec<ItineraryEvent>> {
        let guard = self.snapshot.read().await;
        match guard.as_ref() {
            Some(snap) if snap.trip_id == *trip_id => Some(snap.events()),
            _ => None,
        }
    }

    async fn snapshot_entry(&self, id: &EventId) -> Option<SnapshotEntry> {
        let guard = self.snapshot.read().await;
        guard.as_ref().and_then(|snap| snap.get(id).cloned())
    }

    async fn install_snapshot_if_current(&self, trip_id: &TripId, events: &[ItineraryEvent]) {
        if self.session.current_trip().await.as_ref() != Some(trip_id) {
            return;
        }
        let mut guard = self.snapshot.write().await;
        *guard = Some(EventsSnapshot::from_events(
            trip_id.clone(),
            events,
            SyncPhase::Confirmed,
        ));
    }

    /// 現在の旅行ならスナップショットを用意し、位相を追跡するかを返す
    async fn ensure_snapshot(&self, trip_id: &TripId) -> Result<bool, AppError> {
        if self.session.current_trip().await.as_ref() != Some(trip_id) {
            return Ok(false);
        }
        {
            let guard = self.snapshot.read().await;
            if let Some(snap) = guard.as_ref() {
                if snap.trip_id == *trip_id {
                    return Ok(true);
                }
            }
        }
        let events = self.load_events_routed(trip_id).await?;
        let mut guard = self.snapshot.write().await;
        *guard = Some(EventsSnapshot::from_events(
            trip_id.clone(),
            &events,
            SyncPhase::Confirmed,
        ));
        Ok(true)
    }

    async fn with_snapshot<F, R>(&self, trip_id: &TripId, f: F) -> Option<R>
    where
        F: FnOnce(&mut EventsSnapshot) -> R,
    {
        let mut guard = self.snapshot.write().await;
        match guard.as_mut() {
            Some(snap) if snap.trip_id == *trip_id => Some(f(snap)),
            _ => None,
        }
    }

    async fn rollback_event(
        &self,
        trip_id: &TripId,
        id: &EventId,
        previous: Option<SnapshotEntry>,
    ) {
        self.with_snapshot(trip_id, |snap| {
            snap.remove(id);
            if let Some(previous) = previous {
                snap.upsert(previous.event, previous.phase);
            }
        })
        .await;
    }

    async fn restore_snapshot(&self, previous: Option<EventsSnapshot>) {
        if let Some(previous) = previous {
            *self.snapshot.write().await = Some(previous);
        }
    }

    async fn queue_event_write(
        &self,
        kind: MutationKind,
        event: &ItineraryEvent,
    ) -> Result<(), AppError> {
        self.store.put_event(event).await?;
        let draft = PendingMutationDraft::new(
            kind,
            EntityKind::Event,
            event.id.to_string(),
            serde_json::to_value(event)?,
        );
        let mutation_id = self.store.enqueue_mutation(draft).await?;
        debug!(
            mutation_id,
            event_id = %event.id,
            kind = kind.as_str(),
            "Event write queued"
        );
        Ok(())
    }

    async fn queue_event_delete(&self, event: &ItineraryEvent) -> Result<(), AppError> {
        self.store.delete_event(&event.id).await?;
        let draft = PendingMutationDraft::delete(EntityKind::Event, event.id.to_string());
        let mutation_id = self.store.enqueue_mutation(draft).await?;
        debug!(mutation_id, event_id = %event.id, "Event delete queued");
        Ok(())
    }

    async fn queue_batch_update(
        &self,
        trip_id: &TripId,
        events: &[ItineraryEvent],
    ) -> Result<(), AppError> {
        self.store.replace_events(trip_id, events).await?;
        for event in events {
            let draft = PendingMutationDraft::update(
                EntityKind::Event,
                event.id.to_string(),
                serde_json::to_value(event)?,
            );
            self.store.enqueue_mutation(draft).await?;
        }
        debug!(trip_id = %trip_id, count = events.len(), "Batch update queued");
        Ok(())
    }

    /// 開いている旅行が削除されたらセッションと購読を畳む
    async fn forget_trip_session(&self, id: &TripId) -> Result<(), AppError> {
        if self.session.current_trip().await.as_ref() == Some(id) {
            self.session.switch_trip(None).await;
            self.store.delete_meta(meta::CURRENT_TRIP_ID).await?;
            *self.snapshot.write().await = None;
            if let Ok(mut guard) = self.event_subscription.lock() {
                if let Some(subscription) = guard.take() {
                    subscription.unsubscribe();
                }
            }
        }
        Ok(())
    }
}

impl Clone for StorageService {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            gateway: self.gateway.clone(),
            sync: self.sync.clone(),
            session: self.session.clone(),
            place_cache: self.place_cache.clone(),
            snapshot: self.snapshot.clone(),
            write_gate: self.write_gate.clone(),
            event_subscription: self.event_subscription.clone(),
            connectivity_subscription: self.connectivity_subscription.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{DayOffset, EventCategory};

    fn event_on(trip_id: &TripId, title: &str, day: i32, sort_order: i32) -> ItineraryEvent {
        let day = DayOffset::new(day).unwrap();
        ItineraryEvent::new(trip_id.clone(), EventCategory::Play, title.to_string(), day)
            .with_sort_order(sort_order)
    }

    #[test]
    fn test_snapshot_orders_like_local_store() {
        let trip_id = TripId::generate();
        let breakfast = event_on(&trip_id, "Breakfast", 1, 0);
        let museum = event_on(&trip_id, "Museum", 0, 1);
        let station = event_on(&trip_id, "Station", 0, 0);
        let someday = event_on(&trip_id, "Someday", -1, 0);

        let snap = EventsSnapshot::from_events(
            trip_id,
            &[breakfast.clone(), museum.clone(), station.clone(), someday.clone()],
            SyncPhase::Confirmed,
        );

        let titles: Vec<String> = snap.events().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Someday", "Station", "Museum", "Breakfast"]);
    }

    #[test]
    fn test_snapshot_upsert_replaces_whole_entry() {
        let trip_id = TripId::generate();
        let event = event_on(&trip_id, "Lunch", 0, 0);
        let mut snap = EventsSnapshot::from_events(trip_id, &[event.clone()], SyncPhase::Confirmed);

        let mut edited = event.clone();
        edited.title = "Late lunch".to_string();
        snap.upsert(edited, SyncPhase::Pending);

        assert_eq!(snap.len(), 1);
        assert_eq!(snap.phase_of(&event.id), Some(SyncPhase::Pending));
        assert_eq!(snap.get(&event.id).unwrap().event.title, "Late lunch");
    }

    #[test]
    fn test_snapshot_remove_returns_previous_entry() {
        let trip_id = TripId::generate();
        let event = event_on(&trip_id, "Lunch", 0, 0);
        let mut snap = EventsSnapshot::from_events(trip_id, &[event.clone()], SyncPhase::Confirmed);

        let removed = snap.remove(&event.id).unwrap();
        assert_eq!(removed.event.id, event.id);
        assert_eq!(removed.phase, SyncPhase::Confirmed);
        assert!(snap.is_empty());
        assert!(snap.remove(&event.id).is_none());
    }
}
