use super::ConnectionPool;
use crate::shared::error::AppError;

mod documents;
mod events;
mod mapper;
mod meta;
mod mutations;
mod queries;
mod trips;

/// sqlx/SQLite実装のローカルストア。
/// 各エンティティのトレイト実装は同名のサブモジュールにある。
pub struct SqliteLocalStore {
    pool: ConnectionPool,
}

impl SqliteLocalStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub async fn initialize(&self) -> Result<(), AppError> {
        self.pool.migrate().await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<bool, AppError> {
        let result = sqlx::query("SELECT 1")
            .fetch_one(self.pool.get_pool())
            .await;
        Ok(result.is_ok())
    }
}
