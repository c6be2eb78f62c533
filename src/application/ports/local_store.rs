use crate::domain::entities::{
    ItineraryEvent, PendingMutation, PendingMutationDraft, Trip, TripDocument,
};
use crate::domain::value_objects::{DocumentId, EventId, TripId};
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait TripStore: Send + Sync {
    async fn get_trip(&self, id: &TripId) -> Result<Option<Trip>, AppError>;
    async fn list_trips(&self) -> Result<Vec<Trip>, AppError>;
    /// 同一IDがあれば行ごと置き換える（LWW）
    async fn put_trip(&self, trip: &Trip) -> Result<(), AppError>;
    async fn delete_trip(&self, id: &TripId) -> Result<(), AppError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_event(&self, id: &EventId) -> Result<Option<ItineraryEvent>, AppError>;
    /// 日オフセット・ソート順で整列した旅行内の全イベント
    async fn list_events(&self, trip_id: &TripId) -> Result<Vec<ItineraryEvent>, AppError>;
    async fn put_event(&self, event: &ItineraryEvent) -> Result<(), AppError>;
    /// 旅行の全イベントをスナップショットで入れ替える。1トランザクションで行う。
    async fn replace_events(
        &self,
        trip_id: &TripId,
        events: &[ItineraryEvent],
    ) -> Result<(), AppError>;
    async fn delete_event(&self, id: &EventId) -> Result<(), AppError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_document(&self, id: &DocumentId) -> Result<Option<TripDocument>, AppError>;
    async fn list_documents(&self, trip_id: &TripId) -> Result<Vec<TripDocument>, AppError>;
    async fn put_document(&self, document: &TripDocument) -> Result<(), AppError>;
    async fn delete_document(&self, id: &DocumentId) -> Result<(), AppError>;
}

#[async_trait]
pub trait MutationQueue: Send + Sync {
    /// キュー末尾に追加し、採番されたIDを返す
    async fn enqueue_mutation(&self, draft: PendingMutationDraft) -> Result<i64, AppError>;
    /// 未送信分をFIFO順で返す
    async fn pending_mutations(&self) -> Result<Vec<PendingMutation>, AppError>;
    async fn pending_mutation_count(&self) -> Result<u32, AppError>;
    async fn mark_mutation_synced(&self, id: i64) -> Result<(), AppError>;
    /// 送信済みエントリを物理削除し、削除件数を返す
    async fn clear_synced_mutations(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait MetaStore: Send + Sync {
    async fn get_meta(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set_meta(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn delete_meta(&self, key: &str) -> Result<(), AppError>;
}

/// ローカルストア全体。個別トレイトをまとめた合成ポート。
pub trait LocalStore:
    TripStore + EventStore + DocumentStore + MutationQueue + MetaStore
{
}

impl<T> LocalStore for T where
    T: TripStore + EventStore + DocumentStore + MutationQueue + MetaStore
{
}
