use crate::application::services::StorageService;
use crate::domain::entities::{EventPatch, GeoPoint, ItineraryEvent};
use crate::domain::value_objects::{DayOffset, EventCategory, EventId, PlaceId, TripId};
use crate::presentation::dto::event::{
    CreateEventRequest, EventDto, GeoPointDto, ReplaceEventsRequest, UpdateEventRequest,
};
use crate::presentation::dto::place::{PlaceDetailsDto, SavedPlaceDto};
use crate::presentation::dto::Validate;
use crate::shared::AppError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct EventHandler {
    storage: Arc<StorageService>,
}

impl EventHandler {
    pub fn new(storage: Arc<StorageService>) -> Self {
        Self { storage }
    }

    pub async fn create_event(&self, request: CreateEventRequest) -> Result<EventDto, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let trip_id = parse_trip_id(&request.trip_id)?;
        let category = parse_category(&request.category)?;
        let day = parse_day(request.day)?;

        let mut event = ItineraryEvent::new(
            trip_id,
            category,
            request.title.trim().to_string(),
            day,
        );
        if let Some(sort_order) = request.sort_order {
            event = event.with_sort_order(sort_order);
        }
        if let Some(location) = request.location {
            event = event.with_location(parse_geo_point(location)?);
        }
        event.start_time = request.start_time;
        event.end_time = request.end_time;
        event.image_url = request.image_url;

        let saved = self.storage.create_event(event).await?;
        Ok(saved.into())
    }

    pub async fn get_events(&self, trip_id: &str) -> Result<Vec<EventDto>, AppError> {
        let trip_id = parse_trip_id(trip_id)?;
        let events = self.storage.get_events(&trip_id).await?;
        Ok(events.into_iter().map(EventDto::from).collect())
    }

    pub async fn refresh_events(&self, trip_id: &str) -> Result<Vec<EventDto>, AppError> {
        let trip_id = parse_trip_id(trip_id)?;
        let events = self.storage.refresh_events(&trip_id).await?;
        Ok(events.into_iter().map(EventDto::from).collect())
    }

    pub async fn events_for_day(&self, trip_id: &str, day: u32) -> Result<Vec<EventDto>, AppError> {
        let trip_id = parse_trip_id(trip_id)?;
        let events = self.storage.events_for_day(&trip_id, day).await?;
        Ok(events.into_iter().map(EventDto::from).collect())
    }

    pub async fn update_event(&self, request: UpdateEventRequest) -> Result<EventDto, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let id = parse_event_id(&request.id)?;
        let category = match request.category.as_deref() {
            Some(value) => Some(parse_category(value)?),
            None => None,
        };
        let day = match request.day {
            Some(value) => Some(parse_day(value)?),
            None => None,
        };
        let location = match request.location {
            Some(dto) => Some(parse_geo_point(dto)?),
            None => None,
        };
        let patch = EventPatch {
            category,
            title: request.title,
            start_time: request.start_time,
            end_time: request.end_time,
            rating: request.rating,
            review_count: request.review_count,
            image_url: request.image_url,
            status_text: request.status_text,
            duration_text: request.duration_text,
            travel_time: request.travel_time,
            travel_distance: request.travel_distance,
            travel_mode: request.travel_mode,
            day,
            sort_order: request.sort_order,
            location,
            is_day_start: request.is_day_start,
            is_day_end: request.is_day_end,
        };

        let saved = self.storage.update_event(&id, patch).await?;
        Ok(saved.into())
    }

    /// 並べ替えや一括編集。旅行のイベント集合をまるごと置き換える。
    pub async fn replace_events(
        &self,
        request: ReplaceEventsRequest,
    ) -> Result<Vec<EventDto>, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let trip_id = parse_trip_id(&request.trip_id)?;
        let events = request
            .events
            .into_iter()
            .map(parse_event_dto)
            .collect::<Result<Vec<_>, _>>()?;

        let saved = self.storage.update_events(&trip_id, events).await?;
        Ok(saved.into_iter().map(EventDto::from).collect())
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        let id = parse_event_id(id)?;
        self.storage.delete_event(&id).await
    }

    pub async fn saved_places(&self, trip_id: &str) -> Result<Vec<SavedPlaceDto>, AppError> {
        let trip_id = parse_trip_id(trip_id)?;
        let places = self.storage.saved_places(&trip_id).await?;
        Ok(places.into_iter().map(SavedPlaceDto::from).collect())
    }

    /// 地図プロバイダから取得した場所詳細をキャッシュに取り込む
    pub fn cache_place_details(&self, request: PlaceDetailsDto) -> Result<(), AppError> {
        request.validate().map_err(AppError::Validation)?;

        let place_id = PlaceId::new(request.place_id).map_err(AppError::Validation)?;
        let mut details = crate::domain::entities::PlaceDetails::new(place_id);
        details.name = request.name;
        details.rating = request.rating;
        details.review_count = request.review_count;
        details.image_url = request.image_url;
        details.address = request.address;
        details.opening_hours = request.opening_hours;

        self.storage.cache_place_details(details);
        Ok(())
    }

    /// 楽観的更新の確定段階（pending / confirmed）。追跡外ならNone。
    pub async fn event_phase(&self, id: &str) -> Result<Option<String>, AppError> {
        let id = parse_event_id(id)?;
        Ok(self
            .storage
            .event_phase(&id)
            .await
            .map(|phase| phase.as_str().to_string()))
    }
}

fn parse_trip_id(value: &str) -> Result<TripId, AppError> {
    TripId::new(value.to_string()).map_err(AppError::Validation)
}

fn parse_event_id(value: &str) -> Result<EventId, AppError> {
    EventId::new(value.to_string()).map_err(AppError::Validation)
}

fn parse_category(value: &str) -> Result<EventCategory, AppError> {
    value.parse().map_err(AppError::Validation)
}

fn parse_day(value: i32) -> Result<DayOffset, AppError> {
    DayOffset::new(value).map_err(AppError::Validation)
}

fn parse_geo_point(dto: GeoPointDto) -> Result<GeoPoint, AppError> {
    let place_id = match dto.place_id {
        Some(value) => Some(PlaceId::new(value).map_err(AppError::Validation)?),
        None => None,
    };
    Ok(GeoPoint {
        latitude: dto.latitude,
        longitude: dto.longitude,
        place_id,
        address: dto.address,
        opening_hours: dto.opening_hours,
    })
}

fn parse_timestamp(millis: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Validation(format!("Invalid timestamp: {millis}")))
}

/// 一括更新で届いた完全なイベント行をドメイン型に戻す
fn parse_event_dto(dto: EventDto) -> Result<ItineraryEvent, AppError> {
    let location = match dto.location {
        Some(point) => Some(parse_geo_point(point)?),
        None => None,
    };
    Ok(ItineraryEvent {
        id: parse_event_id(&dto.id)?,
        trip_id: parse_trip_id(&dto.trip_id)?,
        category: parse_category(&dto.category)?,
        title: dto.title,
        start_time: dto.start_time,
        end_time: dto.end_time,
        rating: dto.rating,
        review_count: dto.review_count,
        image_url: dto.image_url,
        status_text: dto.status_text,
        duration_text: dto.duration_text,
        travel_time: dto.travel_time,
        travel_distance: dto.travel_distance,
        travel_mode: dto.travel_mode,
        day: parse_day(dto.day)?,
        sort_order: dto.sort_order,
        location,
        is_day_start: dto.is_day_start,
        is_day_end: dto.is_day_end,
        created_at: parse_timestamp(dto.created_at)?,
        updated_at: parse_timestamp(dto.updated_at)?,
    })
}
