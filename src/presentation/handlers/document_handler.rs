use crate::application::services::StorageService;
use crate::domain::entities::TripDocument;
use crate::domain::value_objects::{DocumentCategory, DocumentId, TripId};
use crate::presentation::dto::document::{CreateDocumentRequest, DocumentResponse};
use crate::presentation::dto::Validate;
use crate::shared::AppError;
use std::sync::Arc;

pub struct DocumentHandler {
    storage: Arc<StorageService>,
}

impl DocumentHandler {
    pub fn new(storage: Arc<StorageService>) -> Self {
        Self { storage }
    }

    pub async fn create_document(
        &self,
        request: CreateDocumentRequest,
    ) -> Result<DocumentResponse, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let trip_id = parse_trip_id(&request.trip_id)?;
        let category = parse_category(&request.category)?;
        let mut document = TripDocument::new(
            trip_id,
            request.title.trim().to_string(),
            category,
            request.size_text,
            request.mime_type,
            request.file_url,
        );
        if let Some(metadata) = request.metadata {
            document = document.with_metadata(metadata);
        }

        let saved = self.storage.create_document(document).await?;
        Ok(saved.into())
    }

    pub async fn get_documents(&self, trip_id: &str) -> Result<Vec<DocumentResponse>, AppError> {
        let trip_id = parse_trip_id(trip_id)?;
        let documents = self.storage.get_documents(&trip_id).await?;
        Ok(documents.into_iter().map(DocumentResponse::from).collect())
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), AppError> {
        let id = parse_document_id(id)?;
        self.storage.delete_document(&id).await
    }
}

fn parse_trip_id(value: &str) -> Result<TripId, AppError> {
    TripId::new(value.to_string()).map_err(AppError::Validation)
}

fn parse_document_id(value: &str) -> Result<DocumentId, AppError> {
    DocumentId::new(value.to_string()).map_err(AppError::Validation)
}

fn parse_category(value: &str) -> Result<DocumentCategory, AppError> {
    value.parse().map_err(AppError::Validation)
}
