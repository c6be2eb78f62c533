use crate::domain::entities::{ItineraryEvent, Trip, TripDocument};
use crate::domain::value_objects::{DocumentId, EventId, TripId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// realtimeチャネルから届く行単位の変更通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteChange {
    pub event_type: RemoteChangeType,
    /// INSERT/UPDATE時の新しい行。DELETEではNone。
    pub new: Option<serde_json::Value>,
    /// UPDATE/DELETE時の旧い行。INSERTではNone。
    pub old: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemoteChangeType {
    Insert,
    Update,
    Delete,
}

impl RemoteChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteChangeType::Insert => "INSERT",
            RemoteChangeType::Update => "UPDATE",
            RemoteChangeType::Delete => "DELETE",
        }
    }
}

pub type ChangeCallback = Arc<dyn Fn(RemoteChange) + Send + Sync>;

/// 購読の解除ハンドル。unsubscribeは何度呼んでも安全で、Dropでも解除される。
pub trait RealtimeSubscription: Send + Sync {
    fn unsubscribe(&self);
    fn is_active(&self) -> bool;
}

#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// 軽量な生存確認。失敗してもエラーにせずfalseを返す。
    async fn check_connection(&self) -> bool;

    async fn fetch_trip(&self, id: &TripId) -> Result<Option<Trip>, AppError>;
    async fn fetch_trips(&self) -> Result<Vec<Trip>, AppError>;
    async fn insert_trip(&self, trip: &Trip) -> Result<Trip, AppError>;
    /// 行全体を置き換える（LWW）
    async fn update_trip(&self, trip: &Trip) -> Result<Trip, AppError>;
    async fn delete_trip(&self, id: &TripId) -> Result<(), AppError>;

    async fn fetch_event(&self, id: &EventId) -> Result<Option<ItineraryEvent>, AppError>;
    async fn fetch_events(&self, trip_id: &TripId) -> Result<Vec<ItineraryEvent>, AppError>;
    async fn insert_event(&self, event: &ItineraryEvent) -> Result<ItineraryEvent, AppError>;
    async fn update_event(&self, event: &ItineraryEvent) -> Result<ItineraryEvent, AppError>;
    /// 主キー衝突時はマージで上書きする一括upsert
    async fn upsert_events(
        &self,
        events: &[ItineraryEvent],
    ) -> Result<Vec<ItineraryEvent>, AppError>;
    async fn delete_event(&self, id: &EventId) -> Result<(), AppError>;

    async fn fetch_documents(&self, trip_id: &TripId) -> Result<Vec<TripDocument>, AppError>;
    async fn insert_document(&self, document: &TripDocument) -> Result<TripDocument, AppError>;
    async fn delete_document(&self, id: &DocumentId) -> Result<(), AppError>;

    /// 自分の旅行一覧に対する変更購読
    async fn subscribe_trip_changes(
        &self,
        callback: ChangeCallback,
    ) -> Result<Box<dyn RealtimeSubscription>, AppError>;
    /// 特定の旅行のイベント行に対する変更購読
    async fn subscribe_event_changes(
        &self,
        trip_id: &TripId,
        callback: ChangeCallback,
    ) -> Result<Box<dyn RealtimeSubscription>, AppError>;
}
