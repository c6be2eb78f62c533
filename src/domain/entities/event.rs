use crate::domain::value_objects::{DayOffset, EventCategory, EventId, PlaceId, TripId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 地図上の位置と、イベント行に埋め込まれた場所情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub place_id: Option<PlaceId>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryEvent {
    pub id: EventId,
    pub trip_id: TripId,
    pub category: EventCategory,
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
    pub day: DayOffset,
    pub sort_order: i32,
    pub location: Option<GeoPoint>,
    pub is_day_start: bool,
    pub is_day_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItineraryEvent {
    pub fn new(trip_id: TripId, category: EventCategory, title: String, day: DayOffset) -> Self {
        let now = Utc::now();
        Self {
            id: EventId::generate(),
            trip_id,
            category,
            title,
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
            day,
            sort_order: 0,
            location: None,
            is_day_start: false,
            is_day_end: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// 「保存済みスポット」扱いか（日程に載らない）
    pub fn is_saved_place(&self) -> bool {
        self.day.is_unscheduled()
    }

    pub fn place_id(&self) -> Option<&PlaceId> {
        self.location.as_ref().and_then(|loc| loc.place_id.as_ref())
    }

    pub fn apply_patch(&mut self, patch: EventPatch) {
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = Some(start_time);
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = Some(end_time);
        }
        if let Some(rating) = patch.rating {
            self.rating = Some(rating);
        }
        if let Some(review_count) = patch.review_count {
            self.review_count = Some(review_count);
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(status_text) = patch.status_text {
            self.status_text = Some(status_text);
        }
        if let Some(duration_text) = patch.duration_text {
            self.duration_text = Some(duration_text);
        }
        if let Some(travel_time) = patch.travel_time {
            self.travel_time = Some(travel_time);
        }
        if let Some(travel_distance) = patch.travel_distance {
            self.travel_distance = Some(travel_distance);
        }
        if let Some(travel_mode) = patch.travel_mode {
            self.travel_mode = Some(travel_mode);
        }
        if let Some(day) = patch.day {
            self.day = day;
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(is_day_start) = patch.is_day_start {
            self.is_day_start = is_day_start;
        }
        if let Some(is_day_end) = patch.is_day_end {
            self.is_day_end = is_day_end;
        }
        self.touch();
    }
}

/// 部分更新。Someのフィールドだけを上書きする。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    pub category: Option<EventCategory>,
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
    pub day: Option<DayOffset>,
    pub sort_order: Option<i32>,
    pub location: Option<GeoPoint>,
    pub is_day_start: Option<bool>,
    pub is_day_end: Option<bool>,
}
