use crate::application::services::StorageService;
use crate::domain::entities::{Trip, TripPatch};
use crate::domain::value_objects::TripId;
use crate::presentation::dto::trip::{CreateTripRequest, TripResponse, UpdateTripRequest};
use crate::presentation::dto::Validate;
use crate::shared::AppError;
use chrono::NaiveDate;
use std::sync::Arc;

pub struct TripHandler {
    storage: Arc<StorageService>,
}

impl TripHandler {
    pub fn new(storage: Arc<StorageService>) -> Self {
        Self { storage }
    }

    pub async fn create_trip(&self, request: CreateTripRequest) -> Result<TripResponse, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let start_date = parse_start_date(&request.start_date)?;
        let mut trip = Trip::new(
            request.name.trim().to_string(),
            start_date,
            request.duration_days,
        );
        if let Some(url) = request.cover_image_url {
            trip = trip.with_cover_image(url);
        }

        let saved = self.storage.create_trip(trip).await?;
        Ok(saved.into())
    }

    pub async fn get_trip(&self, id: &str) -> Result<Option<TripResponse>, AppError> {
        let id = parse_trip_id(id)?;
        let trip = self.storage.get_trip(&id).await?;
        Ok(trip.map(TripResponse::from))
    }

    pub async fn list_trips(&self) -> Result<Vec<TripResponse>, AppError> {
        let trips = self.storage.list_trips().await?;
        Ok(trips.into_iter().map(TripResponse::from).collect())
    }

    pub async fn update_trip(&self, request: UpdateTripRequest) -> Result<TripResponse, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let id = parse_trip_id(&request.id)?;
        let start_date = match request.start_date.as_deref() {
            Some(value) => Some(parse_start_date(value)?),
            None => None,
        };
        let patch = TripPatch {
            name: request.name,
            start_date,
            duration_days: request.duration_days,
            cover_image_url: request.cover_image_url,
        };

        let saved = self.storage.update_trip(&id, patch).await?;
        Ok(saved.into())
    }

    pub async fn delete_trip(&self, id: &str) -> Result<(), AppError> {
        let id = parse_trip_id(id)?;
        self.storage.delete_trip(&id).await
    }

    pub async fn set_current_trip(&self, id: Option<String>) -> Result<(), AppError> {
        let trip_id = match id {
            Some(value) => Some(parse_trip_id(&value)?),
            None => None,
        };
        self.storage.set_current_trip(trip_id).await
    }

    pub async fn current_trip(&self) -> Option<String> {
        self.storage
            .current_trip_id()
            .await
            .map(|id| id.to_string())
    }
}

fn parse_trip_id(value: &str) -> Result<TripId, AppError> {
    TripId::new(value.to_string()).map_err(AppError::Validation)
}

fn parse_start_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid start date: {value}")))
}
