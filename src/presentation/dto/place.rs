use super::Validate;
use crate::domain::entities::{PlaceDetails, SavedPlace};
use serde::{Deserialize, Serialize};

/// 場所詳細。検索結果の取り込みリクエストにも保存済みスポット応答にも使う。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetailsDto {
    pub place_id: String,
    pub name: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub image_url: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
}

impl From<PlaceDetails> for PlaceDetailsDto {
    fn from(details: PlaceDetails) -> Self {
        Self {
            place_id: details.place_id.to_string(),
            name: details.name,
            rating: details.rating,
            review_count: details.review_count,
            image_url: details.image_url,
            address: details.address,
            opening_hours: details.opening_hours,
        }
    }
}

impl Validate for PlaceDetailsDto {
    fn validate(&self) -> Result<(), String> {
        if self.place_id.trim().is_empty() {
            return Err("Place ID is required".to_string());
        }
        if let Some(rating) = self.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err("Rating must be between 0 and 5".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlaceDto {
    pub place_id: Option<String>,
    pub title: String,
    pub category: String,
    pub details: Option<PlaceDetailsDto>,
    pub event_ids: Vec<String>,
}

impl From<SavedPlace> for SavedPlaceDto {
    fn from(place: SavedPlace) -> Self {
        Self {
            place_id: place.place_id.map(|id| id.to_string()),
            title: place.title,
            category: place.category.to_string(),
            details: place.details.map(PlaceDetailsDto::from),
            event_ids: place.event_ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}
