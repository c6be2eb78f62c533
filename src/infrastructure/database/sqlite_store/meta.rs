use super::queries::{DELETE_META, SELECT_META, UPSERT_META};
use super::SqliteLocalStore;
use crate::application::ports::local_store::MetaStore;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

#[async_trait]
impl MetaStore for SqliteLocalStore {
    async fn get_meta(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query(SELECT_META)
            .bind(key)
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set_meta(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(UPSERT_META)
            .bind(key)
            .bind(value)
            .bind(Utc::now().timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn delete_meta(&self, key: &str) -> Result<(), AppError> {
        sqlx::query(DELETE_META)
            .bind(key)
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }
}
