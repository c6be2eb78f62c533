use crate::domain::value_objects::TripId;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 「いま開いている旅行」を持ち回る値オブジェクト。
/// グローバル変数ではなくcloneして共有する。cloneは同じ状態を指す。
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    current_trip: Arc<RwLock<Option<TripId>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trip(trip_id: TripId) -> Self {
        Self {
            current_trip: Arc::new(RwLock::new(Some(trip_id))),
        }
    }

    pub async fn current_trip(&self) -> Option<TripId> {
        self.current_trip.read().await.clone()
    }

    /// 現在の旅行を切り替え、直前の値を返す
    pub async fn switch_trip(&self, trip_id: Option<TripId>) -> Option<TripId> {
        let mut guard = self.current_trip.write().await;
        std::mem::replace(&mut *guard, trip_id)
    }
}
