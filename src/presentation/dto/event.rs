use super::Validate;
use crate::domain::entities::{GeoPoint, ItineraryEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPointDto {
    pub latitude: f64,
    pub longitude: f64,
    pub place_id: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
}

impl From<GeoPoint> for GeoPointDto {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            place_id: point.place_id.map(|id| id.to_string()),
            address: point.address,
            opening_hours: point.opening_hours,
        }
    }
}

/// イベントの完全な形。一覧の応答にも一括更新の入力にも使う。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
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
    /// 0始まりの日番号。-1は未スケジュール。
    pub day: i32,
    pub sort_order: i32,
    pub location: Option<GeoPointDto>,
    pub is_day_start: bool,
    pub is_day_end: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<ItineraryEvent> for EventDto {
    fn from(event: ItineraryEvent) -> Self {
        Self {
            id: event.id.to_string(),
            trip_id: event.trip_id.to_string(),
            category: event.category.to_string(),
            title: event.title,
            start_time: event.start_time,
            end_time: event.end_time,
            rating: event.rating,
            review_count: event.review_count,
            image_url: event.image_url,
            status_text: event.status_text,
            duration_text: event.duration_text,
            travel_time: event.travel_time,
            travel_distance: event.travel_distance,
            travel_mode: event.travel_mode,
            day: event.day.value(),
            sort_order: event.sort_order,
            location: event.location.map(GeoPointDto::from),
            is_day_start: event.is_day_start,
            is_day_end: event.is_day_end,
            created_at: event.created_at.timestamp_millis(),
            updated_at: event.updated_at.timestamp_millis(),
        }
    }
}

// リクエストDTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub trip_id: String,
    pub category: String,
    pub title: String,
    pub day: i32,
    pub sort_order: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<GeoPointDto>,
}

impl Validate for CreateEventRequest {
    fn validate(&self) -> Result<(), String> {
        if self.trip_id.trim().is_empty() {
            return Err("Trip ID is required".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("Event title is required".to_string());
        }
        if self.title.len() > 300 {
            return Err("Event title is too long (max 300 characters)".to_string());
        }
        if self.day < -1 {
            return Err("Day must be -1 (unscheduled) or a day index".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub id: String,
    pub category: Option<String>,
    pub title: Option<String>,
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
    pub day: Option<i32>,
    pub sort_order: Option<i32>,
    pub location: Option<GeoPointDto>,
    pub is_day_start: Option<bool>,
    pub is_day_end: Option<bool>,
}

impl Validate for UpdateEventRequest {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Event ID is required".to_string());
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err("Event title cannot be empty".to_string());
            }
        }
        if let Some(day) = self.day {
            if day < -1 {
                return Err("Day must be -1 (unscheduled) or a day index".to_string());
            }
        }
        Ok(())
    }
}

/// 並べ替え・一括編集。eventsは対象旅行の完全な新しい姿。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceEventsRequest {
    pub trip_id: String,
    pub events: Vec<EventDto>,
}

impl Validate for ReplaceEventsRequest {
    fn validate(&self) -> Result<(), String> {
        if self.trip_id.trim().is_empty() {
            return Err("Trip ID is required".to_string());
        }
        for event in &self.events {
            if event.id.trim().is_empty() {
                return Err("Every event needs an ID".to_string());
            }
            if event.trip_id != self.trip_id {
                return Err(format!(
                    "Event {} belongs to a different trip",
                    event.id
                ));
            }
            if event.day < -1 {
                return Err("Day must be -1 (unscheduled) or a day index".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dto(trip_id: &str) -> EventDto {
        EventDto {
            id: "e1".to_string(),
            trip_id: trip_id.to_string(),
            category: "eat".to_string(),
            title: "Lunch".to_string(),
            start_time: None,
            end_time: None,
            rating: None,
            review_count: None,
            image_url: None,
            status_text: None,
            duration_text: None,
            travel_time: None,
            travel_distance: None,
            travel_mode: None,
            day: 0,
            sort_order: 0,
            location: None,
            is_day_start: false,
            is_day_end: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_create_request_accepts_unscheduled_day() {
        let request = CreateEventRequest {
            trip_id: "t1".to_string(),
            category: "play".to_string(),
            title: "Aquarium".to_string(),
            day: -1,
            sort_order: None,
            start_time: None,
            end_time: None,
            image_url: None,
            location: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_below_sentinel() {
        let request = CreateEventRequest {
            trip_id: "t1".to_string(),
            category: "play".to_string(),
            title: "Aquarium".to_string(),
            day: -2,
            sort_order: None,
            start_time: None,
            end_time: None,
            image_url: None,
            location: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_replace_request_rejects_foreign_trip() {
        let request = ReplaceEventsRequest {
            trip_id: "t1".to_string(),
            events: vec![sample_dto("t2")],
        };
        assert!(request.validate().is_err());
    }
}
