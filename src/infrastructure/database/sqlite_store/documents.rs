use super::mapper::map_document_row;
use super::queries::{
    DELETE_DOCUMENT, SELECT_DOCUMENTS_BY_TRIP, SELECT_DOCUMENT_BY_ID, UPSERT_DOCUMENT,
};
use super::SqliteLocalStore;
use crate::application::ports::local_store::DocumentStore;
use crate::domain::entities::TripDocument;
use crate::domain::value_objects::{DocumentId, TripId};
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
impl DocumentStore for SqliteLocalStore {
    async fn get_document(&self, id: &DocumentId) -> Result<Option<TripDocument>, AppError> {
        let row = sqlx::query(SELECT_DOCUMENT_BY_ID)
            .bind(id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(map_document_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_documents(&self, trip_id: &TripId) -> Result<Vec<TripDocument>, AppError> {
        let rows = sqlx::query(SELECT_DOCUMENTS_BY_TRIP)
            .bind(trip_id.as_str())
            .fetch_all(self.pool.get_pool())
            .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            documents.push(map_document_row(&row)?);
        }
        Ok(documents)
    }

    async fn put_document(&self, document: &TripDocument) -> Result<(), AppError> {
        let metadata_json = match document.metadata.as_ref() {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        sqlx::query(UPSERT_DOCUMENT)
            .bind(document.id.as_str())
            .bind(document.trip_id.as_str())
            .bind(&document.title)
            .bind(document.category.as_str())
            .bind(&document.size_text)
            .bind(&document.mime_type)
            .bind(&document.file_url)
            .bind(metadata_json)
            .bind(document.created_at.timestamp_millis())
            .bind(document.updated_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<(), AppError> {
        sqlx::query(DELETE_DOCUMENT)
            .bind(id.as_str())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }
}
