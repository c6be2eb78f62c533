use crate::domain::value_objects::{DocumentCategory, DocumentId, TripId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 旅行に添付されたファイル（チケット、予約確認書など）。
/// ファイル本体はリモートのオブジェクトストレージにあり、ここではURLだけを持つ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDocument {
    pub id: DocumentId,
    pub trip_id: TripId,
    pub title: String,
    pub category: DocumentCategory,
    pub size_text: String,
    pub mime_type: String,
    pub file_url: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TripDocument {
    pub fn new(
        trip_id: TripId,
        title: String,
        category: DocumentCategory,
        size_text: String,
        mime_type: String,
        file_url: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::generate(),
            trip_id,
            title,
            category,
            size_text,
            mime_type,
            file_url,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
