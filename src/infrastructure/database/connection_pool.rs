use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ConnectionPool {
    pool: Arc<SqlitePool>,
}

impl ConnectionPool {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        // ファイルDBなら親ディレクトリを先に作る
        let path = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");
        if !path.starts_with(":memory:") {
            let file = path.split('?').next().unwrap_or(path);
            if let Some(parent) = Path::new(file).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!("Database connected: {}", database_url);

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// テスト用のインメモリDB。コネクション1本に固定する。
    pub async fn from_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_pool_migrates() {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();

        let row = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name='trips'")
            .fetch_optional(pool.get_pool())
            .await
            .unwrap();
        assert!(row.is_some());

        pool.close().await;
    }

    #[tokio::test]
    async fn test_file_pool_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("shiori.db");
        let url = format!("sqlite:{}", db_path.display());

        let pool = ConnectionPool::new(&url, 1).await.unwrap();
        pool.migrate().await.unwrap();
        assert!(db_path.exists());

        pool.close().await;
    }
}
