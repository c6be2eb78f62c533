//! 端末ローカルのメタデータキー。metaテーブルの予約キー名。

/// アプリが最後に開いていた旅行のID
pub const CURRENT_TRIP_ID: &str = "current_trip_id";

/// キュー排出が最後に完走した時刻（RFC 3339）
pub const LAST_SYNC_TIME: &str = "last_sync_time";
