use super::Validate;
use crate::domain::entities::Trip;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// レスポンスDTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    pub id: String,
    pub name: String,
    /// ISO 8601の日付（YYYY-MM-DD）
    pub start_date: String,
    pub duration_days: u32,
    pub cover_image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id.to_string(),
            name: trip.name,
            start_date: trip.start_date.to_string(),
            duration_days: trip.duration_days,
            cover_image_url: trip.cover_image_url,
            created_at: trip.created_at.timestamp_millis(),
            updated_at: trip.updated_at.timestamp_millis(),
        }
    }
}

// リクエストDTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    pub name: String,
    pub start_date: String,
    pub duration_days: u32,
    pub cover_image_url: Option<String>,
}

impl Validate for CreateTripRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Trip name is required".to_string());
        }
        if self.name.len() > 200 {
            return Err("Trip name is too long (max 200 characters)".to_string());
        }
        if self.duration_days == 0 {
            return Err("Trip must last at least one day".to_string());
        }
        if NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d").is_err() {
            return Err("Start date must be formatted as YYYY-MM-DD".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTripRequest {
    pub id: String,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub duration_days: Option<u32>,
    pub cover_image_url: Option<String>,
}

impl Validate for UpdateTripRequest {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Trip ID is required".to_string());
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("Trip name cannot be empty".to_string());
            }
        }
        if self.duration_days == Some(0) {
            return Err("Trip must last at least one day".to_string());
        }
        if let Some(date) = &self.start_date {
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err("Start date must be formatted as YYYY-MM-DD".to_string());
            }
        }
        Ok(())
    }
}
