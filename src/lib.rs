//! 旅のしおりアプリのオフライン対応同期レイヤー。
//!
//! ローカルのSQLiteストアとリモートバックエンドの間で旅行・イベント・
//! 書類を同期する。オフライン中の書き込みはキューに積まれ、再接続時に
//! 受付順で再送される。競合はタイムスタンプの新しい行がまるごと勝つ。

// モジュール定義
pub mod application;
pub mod domain;
pub mod engine;
pub mod infrastructure;
pub mod presentation;
pub mod shared;

pub use application::services::{DrainSummary, StorageService, SyncService, SyncStatus};
pub use domain::value_objects::{SyncPhase, SyncState};
pub use engine::SyncEngine;
pub use presentation::{DocumentHandler, EventHandler, SyncHandler, TripHandler};
pub use shared::logging::init as init_logging;
pub use shared::{AppConfig, AppError, Result};
