use super::mapper::map_mutation_row;
use super::queries::{
    COUNT_PENDING_MUTATIONS, DELETE_SYNCED_MUTATIONS, INSERT_MUTATION, MARK_MUTATION_SYNCED,
    SELECT_PENDING_MUTATIONS,
};
use super::SqliteLocalStore;
use crate::application::ports::local_store::MutationQueue;
use crate::domain::entities::{PendingMutation, PendingMutationDraft};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

#[async_trait]
impl MutationQueue for SqliteLocalStore {
    async fn enqueue_mutation(&self, draft: PendingMutationDraft) -> Result<i64, AppError> {
        let payload_json = serde_json::to_string(&draft.payload)?;

        let result = sqlx::query(INSERT_MUTATION)
            .bind(draft.kind.as_str())
            .bind(draft.entity.as_str())
            .bind(&draft.entity_id)
            .bind(payload_json)
            .bind(draft.queued_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn pending_mutations(&self) -> Result<Vec<PendingMutation>, AppError> {
        let rows = sqlx::query(SELECT_PENDING_MUTATIONS)
            .fetch_all(self.pool.get_pool())
            .await?;

        let mut mutations = Vec::with_capacity(rows.len());
        for row in rows {
            mutations.push(map_mutation_row(&row)?);
        }
        Ok(mutations)
    }

    async fn pending_mutation_count(&self) -> Result<u32, AppError> {
        let row = sqlx::query(COUNT_PENDING_MUTATIONS)
            .fetch_one(self.pool.get_pool())
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u32)
    }

    async fn mark_mutation_synced(&self, id: i64) -> Result<(), AppError> {
        sqlx::query(MARK_MUTATION_SYNCED)
            .bind(id)
            .bind(Utc::now().timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn clear_synced_mutations(&self) -> Result<u64, AppError> {
        let result = sqlx::query(DELETE_SYNCED_MUTATIONS)
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected())
    }
}
