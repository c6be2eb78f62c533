use std::sync::Arc;

use tracing::info;

use crate::application::ports::local_store::LocalStore;
use crate::application::ports::remote_gateway::RemoteGateway;
use crate::application::services::{StorageService, SyncService};
use crate::domain::SessionContext;
use crate::infrastructure::cache::PlaceDetailsCache;
use crate::infrastructure::connectivity::PlatformConnectivity;
use crate::infrastructure::database::{ConnectionPool, SqliteLocalStore};
use crate::infrastructure::remote::RestGateway;
use crate::presentation::{DocumentHandler, EventHandler, SyncHandler, TripHandler};
use crate::shared::{AppConfig, AppError};

/// 同期エンジン全体の組み立てと保持。
/// ホスト側はこれを1つ作り、ハンドラ経由で操作する。
pub struct SyncEngine {
    config: AppConfig,
    pool: ConnectionPool,
    storage: Arc<StorageService>,
    connectivity: Arc<PlatformConnectivity>,
}

impl SyncEngine {
    /// 設定からエンジンを組み立てる。
    /// ローカルDBのマイグレーション、初期プローブ、セッション復元まで行う。
    pub async fn initialize(config: AppConfig) -> anyhow::Result<Self> {
        config.validate().map_err(AppError::Config)?;

        let pool =
            ConnectionPool::new(&config.database.url, config.database.max_connections).await?;
        pool.migrate().await?;

        let store: Arc<dyn LocalStore> = Arc::new(SqliteLocalStore::new(pool.clone()));
        let gateway: Arc<dyn RemoteGateway> =
            Arc::new(RestGateway::new(&config.remote, &config.sync)?);
        let sync = Arc::new(SyncService::new(
            store.clone(),
            gateway.clone(),
            &config.sync,
        ));
        let session = SessionContext::default();
        let place_cache = Arc::new(PlaceDetailsCache::new(config.cache.place_capacity));
        let storage = Arc::new(StorageService::new(
            store,
            gateway,
            sync.clone(),
            session,
            place_cache,
        ));
        let connectivity = Arc::new(PlatformConnectivity::default());

        sync.initialize().await?;
        storage.restore_session().await?;
        storage.attach_connectivity(connectivity.as_ref());

        let state = sync.state().await;
        info!(%state, "Sync engine initialized");

        Ok(Self {
            config,
            pool,
            storage,
            connectivity,
        })
    }

    /// 環境変数から設定を読んで組み立てる
    pub async fn from_env() -> anyhow::Result<Self> {
        Self::initialize(AppConfig::from_env()).await
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn storage(&self) -> Arc<StorageService> {
        self.storage.clone()
    }

    pub fn sync(&self) -> Arc<SyncService> {
        self.storage.sync().clone()
    }

    /// OS/ブラウザの接続性ヒントを流し込む入口
    pub fn connectivity(&self) -> Arc<PlatformConnectivity> {
        self.connectivity.clone()
    }

    pub fn trip_handler(&self) -> TripHandler {
        TripHandler::new(self.storage.clone())
    }

    pub fn event_handler(&self) -> EventHandler {
        EventHandler::new(self.storage.clone())
    }

    pub fn document_handler(&self) -> DocumentHandler {
        DocumentHandler::new(self.storage.clone())
    }

    pub fn sync_handler(&self) -> SyncHandler {
        SyncHandler::new(self.storage.clone())
    }

    /// 購読を解除しDBを閉じる
    pub async fn shutdown(&self) {
        self.storage.shutdown();
        self.pool.close().await;
        info!("Sync engine shut down");
    }
}
