use super::Validate;
use crate::domain::entities::TripDocument;
use serde::{Deserialize, Serialize};

// レスポンスDTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub category: String,
    pub size_text: String,
    pub mime_type: String,
    pub file_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<TripDocument> for DocumentResponse {
    fn from(document: TripDocument) -> Self {
        Self {
            id: document.id.to_string(),
            trip_id: document.trip_id.to_string(),
            title: document.title,
            category: document.category.to_string(),
            size_text: document.size_text,
            mime_type: document.mime_type,
            file_url: document.file_url,
            metadata: document.metadata,
            created_at: document.created_at.timestamp_millis(),
            updated_at: document.updated_at.timestamp_millis(),
        }
    }
}

// リクエストDTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub trip_id: String,
    pub title: String,
    pub category: String,
    pub size_text: String,
    pub mime_type: String,
    pub file_url: String,
    pub metadata: Option<serde_json::Value>,
}

impl Validate for CreateDocumentRequest {
    fn validate(&self) -> Result<(), String> {
        if self.trip_id.trim().is_empty() {
            return Err("Trip ID is required".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("Document title is required".to_string());
        }
        if self.mime_type.trim().is_empty() {
            return Err("MIME type is required".to_string());
        }
        if !self.file_url.starts_with("http") {
            return Err("File URL must be an http(s) URL".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_rejects_non_http_url() {
        let request = CreateDocumentRequest {
            trip_id: "t1".to_string(),
            title: "Flight ticket".to_string(),
            category: "ticket".to_string(),
            size_text: "1.2 MB".to_string(),
            mime_type: "application/pdf".to_string(),
            file_url: "file:///tmp/ticket.pdf".to_string(),
            metadata: None,
        };
        assert!(request.validate().is_err());
    }
}
