use crate::domain::entities::{GeoPoint, ItineraryEvent, PendingMutation, Trip, TripDocument};
use crate::domain::value_objects::{
    DayOffset, DocumentCategory, DocumentId, EntityKind, EventCategory, EventId, MutationKind,
    PlaceId, TripId,
};
use crate::shared::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row};

fn timestamp_from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

pub(super) fn map_trip_row(row: &SqliteRow) -> Result<Trip, AppError> {
    let id: String = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let start_date_raw: String = row.try_get("start_date")?;
    let duration_days: i64 = row.try_get("duration_days")?;
    let cover_image_url: Option<String> = row.try_get("cover_image_url")?;
    let created_at: i64 = row.try_get("created_at")?;
    let updated_at: i64 = row.try_get("updated_at")?;

    let start_date = start_date_raw
        .parse::<NaiveDate>()
        .map_err(|e| AppError::Storage(format!("Invalid start_date '{start_date_raw}': {e}")))?;

    Ok(Trip {
        id: TripId::new(id).map_err(AppError::Storage)?,
        name,
        start_date,
        duration_days: duration_days.max(0) as u32,
        cover_image_url,
        created_at: timestamp_from_millis(created_at),
        updated_at: timestamp_from_millis(updated_at),
    })
}

pub(super) fn map_event_row(row: &SqliteRow) -> Result<ItineraryEvent, AppError> {
    let id: String = row.try_get("id")?;
    let trip_id: String = row.try_get("trip_id")?;
    let category_raw: String = row.try_get("category")?;
    let title: String = row.try_get("title")?;
    let start_time: Option<String> = row.try_get("start_time")?;
    let end_time: Option<String> = row.try_get("end_time")?;
    let rating: Option<f64> = row.try_get("rating")?;
    let review_count: Option<i64> = row.try_get("review_count")?;
    let image_url: Option<String> = row.try_get("image_url")?;
    let status_text: Option<String> = row.try_get("status_text")?;
    let duration_text: Option<String> = row.try_get("duration_text")?;
    let travel_time: Option<String> = row.try_get("travel_time")?;
    let travel_distance: Option<String> = row.try_get("travel_distance")?;
    let travel_mode: Option<String> = row.try_get("travel_mode")?;
    let day: i64 = row.try_get("day")?;
    let sort_order: i64 = row.try_get("sort_order")?;
    let latitude: Option<f64> = row.try_get("latitude")?;
    let longitude: Option<f64> = row.try_get("longitude")?;
    let place_id: Option<String> = row.try_get("place_id")?;
    let address: Option<String> = row.try_get("address")?;
    let opening_hours: Option<String> = row.try_get("opening_hours")?;
    let is_day_start: bool = row.try_get("is_day_start")?;
    let is_day_end: bool = row.try_get("is_day_end")?;
    let created_at: i64 = row.try_get("created_at")?;
    let updated_at: i64 = row.try_get("updated_at")?;

    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
            place_id: place_id.and_then(|p| PlaceId::new(p).ok()),
            address,
            opening_hours,
        }),
        _ => None,
    };

    Ok(ItineraryEvent {
        id: EventId::new(id).map_err(AppError::Storage)?,
        trip_id: TripId::new(trip_id).map_err(AppError::Storage)?,
        category: category_raw
            .parse::<EventCategory>()
            .map_err(AppError::Storage)?,
        title,
        start_time,
        end_time,
        rating,
        review_count: review_count.map(|v| v.max(0) as u32),
        image_url,
        status_text,
        duration_text,
        travel_time,
        travel_distance,
        travel_mode,
        day: DayOffset::new(day as i32).map_err(AppError::Storage)?,
        sort_order: sort_order as i32,
        location,
        is_day_start,
        is_day_end,
        created_at: timestamp_from_millis(created_at),
        updated_at: timestamp_from_millis(updated_at),
    })
}

pub(super) fn map_document_row(row: &SqliteRow) -> Result<TripDocument, AppError> {
    let id: String = row.try_get("id")?;
    let trip_id: String = row.try_get("trip_id")?;
    let title: String = row.try_get("title")?;
    let category_raw: String = row.try_get("category")?;
    let size_text: String = row.try_get("size_text")?;
    let mime_type: String = row.try_get("mime_type")?;
    let file_url: String = row.try_get("file_url")?;
    let metadata_raw: Option<String> = row.try_get("metadata")?;
    let created_at: i64 = row.try_get("created_at")?;
    let updated_at: i64 = row.try_get("updated_at")?;

    Ok(TripDocument {
        id: DocumentId::new(id).map_err(AppError::Storage)?,
        trip_id: TripId::new(trip_id).map_err(AppError::Storage)?,
        title,
        category: category_raw
            .parse::<DocumentCategory>()
            .map_err(AppError::Storage)?,
        size_text,
        mime_type,
        file_url,
        metadata: metadata_raw.and_then(|raw| serde_json::from_str(&raw).ok()),
        created_at: timestamp_from_millis(created_at),
        updated_at: timestamp_from_millis(updated_at),
    })
}

pub(super) fn map_mutation_row(row: &SqliteRow) -> Result<PendingMutation, AppError> {
    let id: i64 = row.try_get("id")?;
    let kind_raw: String = row.try_get("kind")?;
    let entity_raw: String = row.try_get("entity")?;
    let entity_id: String = row.try_get("entity_id")?;
    let payload_raw: String = row.try_get("payload")?;
    let queued_at: i64 = row.try_get("queued_at")?;
    let synced: bool = row.try_get("synced")?;
    let synced_at: Option<i64> = row.try_get("synced_at")?;

    Ok(PendingMutation {
        id,
        kind: kind_raw
            .parse::<MutationKind>()
            .map_err(AppError::Storage)?,
        entity: entity_raw.parse::<EntityKind>().map_err(AppError::Storage)?,
        entity_id,
        payload: serde_json::from_str(&payload_raw)?,
        queued_at: timestamp_from_millis(queued_at),
        synced,
        synced_at: synced_at.map(timestamp_from_millis),
    })
}
