use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// リモート側テーブルの行。列名はバックエンドのスネークケース命名に合わせ、
// ドメインモデルとの対応はmapperだけが知っている。

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct TripRow {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct EventRow {
    pub id: String,
    pub trip_id: String,
    pub category: String,
    pub title: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub image_url: Option<String>,
    pub status_text: Option<String>,
    pub duration_text: Option<String>,
    pub travel_time: Option<String>,
    pub travel_distance: Option<String>,
    pub travel_mode: Option<String>,
    /// -1は「日程未定（保存済みスポット）」
    pub day: i32,
    pub sort_order: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_id: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
    pub is_day_start: bool,
    pub is_day_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct DocumentRow {
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub category: String,
    pub size_text: String,
    pub mime_type: String,
    pub file_url: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
