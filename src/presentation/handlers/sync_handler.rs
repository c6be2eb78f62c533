use crate::application::services::StorageService;
use crate::presentation::dto::sync::{SyncStatusResponse, SyncSummaryResponse};
use crate::shared::AppError;
use std::sync::Arc;

pub struct SyncHandler {
    storage: Arc<StorageService>,
}

impl SyncHandler {
    pub fn new(storage: Arc<StorageService>) -> Self {
        Self { storage }
    }

    /// 手動同期。到達できなければConnectivityエラーになる。
    pub async fn sync_now(&self) -> Result<SyncSummaryResponse, AppError> {
        let summary = self.storage.sync_now().await?;
        Ok(summary.into())
    }

    pub async fn sync_status(&self) -> Result<SyncStatusResponse, AppError> {
        let status = self.storage.sync_status().await?;
        Ok(status.into())
    }

    pub async fn last_sync_time(&self) -> Result<Option<i64>, AppError> {
        let time = self.storage.last_sync_time().await?;
        Ok(time.map(|t| t.timestamp_millis()))
    }
}
