use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::application::ports::local_store::LocalStore;
use crate::application::ports::remote_gateway::RemoteGateway;
use crate::domain::entities::{ItineraryEvent, PendingMutation, Trip, TripDocument};
use crate::domain::value_objects::{
    meta, DocumentId, EntityKind, EventId, MutationKind, SyncState, TripId,
};
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;

/// 1回のキュー排出の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainSummary {
    /// リモートへ反映できた件数
    pub replayed: usize,
    /// 再送不能として破棄した件数
    pub skipped: usize,
    /// 接続断で持ち越した件数
    pub remaining: usize,
    pub went_offline: bool,
}

/// UI向けの同期ステータススナップショット
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatus {
    pub state: SyncState,
    pub pending_count: u32,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub conflict_overwrites: u64,
}

/// 同期オーケストレータ。Online/Offline/Syncingの状態機械と
/// ミューテーションキューのFIFO排出を受け持つ。
pub struct SyncService {
    store: Arc<dyn LocalStore>,
    gateway: Arc<dyn RemoteGateway>,
    state: RwLock<SyncState>,
    state_tx: watch::Sender<SyncState>,
    drain_lock: Mutex<()>,
    conflict_detection: bool,
    conflict_overwrites: AtomicU64,
}

impl SyncService {
    pub fn new(
        store: Arc<dyn LocalStore>,
        gateway: Arc<dyn RemoteGateway>,
        config: &SyncConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(SyncState::Offline);
        Self {
            store,
            gateway,
            state: RwLock::new(SyncState::Offline),
            state_tx,
            drain_lock: Mutex::new(()),
            conflict_detection: config.conflict_detection,
            conflict_overwrites: AtomicU64::new(0),
        }
    }

    /// 起動時の初期判定。プローブが通れば積み残しを排出してOnlineになる。
    /// プローブ自体が失敗したらOfflineから始める。
    pub async fn initialize(&self) -> Result<(), AppError> {
        if self.gateway.check_connection().await {
            self.drain().await?;
        } else {
            info!("Starting offline, queue untouched");
            self.set_state(SyncState::Offline).await;
        }
        Ok(())
    }

    pub async fn state(&self) -> SyncState {
        *self.state.read().await
    }

    /// 状態遷移の購読口
    pub fn watch_state(&self) -> watch::Receiver<SyncState> {
        self.state_tx.subscribe()
    }

    pub async fn routes_to_remote(&self) -> bool {
        self.state().await.routes_to_remote()
    }

    pub fn conflict_overwrites(&self) -> u64 {
        self.conflict_overwrites.load(Ordering::Relaxed)
    }

    pub async fn last_sync_time(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let raw = self.store.get_meta(meta::LAST_SYNC_TIME).await?;
        Ok(raw.and_then(|value| {
            DateTime::parse_from_rfc3339(&value)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }))
    }

    pub async fn status(&self) -> Result<SyncStatus, AppError> {
        Ok(SyncStatus {
            state: self.state().await,
            pending_count: self.store.pending_mutation_count().await?,
            last_sync_time: self.last_sync_time().await?,
            conflict_overwrites: self.conflict_overwrites(),
        })
    }

    /// Connectivity Monitorのエッジ通知の受け口。
    /// trueは到達性のヒントにすぎないので、プローブで裏を取ってから排出する。
    pub async fn handle_connectivity_hint(&self, online: bool) {
        if !online {
            self.set_state(SyncState::Offline).await;
            return;
        }
        if self.state().await.routes_to_remote() {
            return;
        }
        if !self.gateway.check_connection().await {
            debug!("Reconnect hint not confirmed by probe, staying offline");
            return;
        }
        if let Err(e) = self.drain().await {
            error!(error = %e, "Drain after reconnect failed");
        }
    }

    /// 生書き込みがConnectivityで落ちたときの暗黙のOnline→Offline遷移
    pub async fn note_connectivity_failure(&self) {
        self.set_state(SyncState::Offline).await;
    }

    /// キューをFIFOで排出する。排出中はSyncingとなり、新規書き込みは
    /// 排出を待たずに直接リモートへ向かう。
    pub async fn drain(&self) -> Result<DrainSummary, AppError> {
        let _guard = self.drain_lock.lock().await;
        self.set_state(SyncState::Syncing).await;

        match self.drain_queue().await {
            Ok(summary) => {
                if summary.went_offline {
                    self.set_state(SyncState::Offline).await;
                } else {
                    self.set_state(SyncState::Online).await;
                }
                Ok(summary)
            }
            Err(e) => {
                // ローカルストア側の失敗。到達性は確認済みなのでOnlineへ戻し、キューは残す。
                self.set_state(SyncState::Online).await;
                Err(e)
            }
        }
    }

    async fn drain_queue(&self) -> Result<DrainSummary, AppError> {
        let pending = self.store.pending_mutations().await?;
        let total = pending.len();

        let mut replayed = 0usize;
        let mut skipped = 0usize;

        // 同一エンティティへの連続編集の順序を保つため、並列化せず1件ずつ送る
        for mutation in pending {
            match self.replay_mutation(&mutation).await {
                Ok(()) => {
                    self.store.mark_mutation_synced(mutation.id).await?;
                    replayed += 1;
                }
                Err(e) if e.is_connectivity() => {
                    warn!(
                        mutation_id = mutation.id,
                        error = %e,
                        "Replay hit a connectivity error, deferring the rest"
                    );
                    return Ok(DrainSummary {
                        replayed,
                        skipped,
                        remaining: total - replayed - skipped,
                        went_offline: true,
                    });
                }
                Err(e) => {
                    // 再送しても同じ結果にしかならない失敗。印を付けて先に進む。
                    error!(
                        mutation_id = mutation.id,
                        entity_id = %mutation.entity_id,
                        error = %e,
                        "Dropping unreplayable mutation"
                    );
                    self.store.mark_mutation_synced(mutation.id).await?;
                    skipped += 1;
                }
            }
        }

        let cleared = self.store.clear_synced_mutations().await?;
        self.store
            .set_meta(meta::LAST_SYNC_TIME, &Utc::now().to_rfc3339())
            .await?;
        info!(replayed, skipped, cleared, "Queue drained");
        Ok(DrainSummary {
            replayed,
            skipped,
            remaining: 0,
            went_offline: false,
        })
    }

    async fn replay_mutation(&self, mutation: &PendingMutation) -> Result<(), AppError> {
        debug!(
            mutation_id = mutation.id,
            kind = mutation.kind.as_str(),
            entity = mutation.entity.as_str(),
            entity_id = %mutation.entity_id,
            "Replaying mutation"
        );
        match (mutation.entity, mutation.kind) {
            (EntityKind::Trip, MutationKind::Create) => {
                let trip: Trip = serde_json::from_value(mutation.payload.clone())?;
                self.gateway.insert_trip(&trip).await.map(|_| ())
            }
            (EntityKind::Trip, MutationKind::Update) => {
                let trip: Trip = serde_json::from_value(mutation.payload.clone())?;
                if self.conflict_detection {
                    let remote = self.probe_remote_trip(&trip.id).await?;
                    self.note_conflict_if_newer(mutation, remote);
                }
                self.gateway.update_trip(&trip).await.map(|_| ())
            }
            (EntityKind::Trip, MutationKind::Delete) => {
                let id = TripId::new(mutation.entity_id.clone()).map_err(AppError::Validation)?;
                self.gateway.delete_trip(&id).await
            }
            (EntityKind::Event, MutationKind::Create) => {
                let event: ItineraryEvent = serde_json::from_value(mutation.payload.clone())?;
                self.gateway.insert_event(&event).await.map(|_| ())
            }
            (EntityKind::Event, MutationKind::Update) => {
                let event: ItineraryEvent = serde_json::from_value(mutation.payload.clone())?;
                if self.conflict_detection {
                    let remote = self.probe_remote_event(&event.id).await?;
                    self.note_conflict_if_newer(mutation, remote);
                }
                // 行ごと上書き（部分マージはしない）。リモートで消えていた行は復活する。
                self.gateway
                    .upsert_events(std::slice::from_ref(&event))
                    .await
                    .map(|_| ())
            }
            (EntityKind::Event, MutationKind::Delete) => {
                let id = EventId::new(mutation.entity_id.clone()).map_err(AppError::Validation)?;
                self.gateway.delete_event(&id).await
            }
            (EntityKind::Document, MutationKind::Create) => {
                let document: TripDocument = serde_json::from_value(mutation.payload.clone())?;
                self.gateway.insert_document(&document).await.map(|_| ())
            }
            (EntityKind::Document, MutationKind::Delete) => {
                let id =
                    DocumentId::new(mutation.entity_id.clone()).map_err(AppError::Validation)?;
                self.gateway.delete_document(&id).await
            }
            (EntityKind::Document, MutationKind::Update) => Err(AppError::Validation(
                "documents are immutable, update cannot be replayed".to_string(),
            )),
        }
    }

    /// 競合検知用にリモート側のupdated_atを覗く。検知はベストエフォートで、
    /// 接続断以外の失敗では再生自体は止めない。
    async fn probe_remote_trip(&self, id: &TripId) -> Result<Option<DateTime<Utc>>, AppError> {
        match self.gateway.fetch_trip(id).await {
            Ok(remote) => Ok(remote.map(|t| t.updated_at)),
            Err(e) if e.is_connectivity() => Err(e),
            Err(e) => {
                debug!(error = %e, "Conflict check skipped");
                Ok(None)
            }
        }
    }

    async fn probe_remote_event(&self, id: &EventId) -> Result<Option<DateTime<Utc>>, AppError> {
        match self.gateway.fetch_event(id).await {
            Ok(remote) => Ok(remote.map(|e| e.updated_at)),
            Err(e) if e.is_connectivity() => Err(e),
            Err(e) => {
                debug!(error = %e, "Conflict check skipped");
                Ok(None)
            }
        }
    }

    fn note_conflict_if_newer(
        &self,
        mutation: &PendingMutation,
        remote_updated_at: Option<DateTime<Utc>>,
    ) {
        if let Some(remote_updated_at) = remote_updated_at {
            if remote_updated_at > mutation.queued_at {
                self.conflict_overwrites.fetch_add(1, Ordering::Relaxed);
                warn!(
                    entity = mutation.entity.as_str(),
                    entity_id = %mutation.entity_id,
                    queued_at = %mutation.queued_at,
                    %remote_updated_at,
                    "conflict_overwrite: replay clobbers a newer remote edit"
                );
            }
        }
    }

    async fn set_state(&self, next: SyncState) {
        let mut guard = self.state.write().await;
        if *guard == next {
            return;
        }
        info!(from = %*guard, to = %next, "Sync state changed");
        *guard = next;
        let _ = self.state_tx.send(next);
    }
}
