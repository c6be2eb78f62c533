use crate::domain::entities::{GeoPoint, ItineraryEvent, Trip, TripDocument};
use crate::domain::value_objects::{DayOffset, DocumentId, EventId, PlaceId, TripId};
use crate::shared::error::AppError;

use super::rows::{DocumentRow, EventRow, TripRow};

pub(super) fn trip_to_row(trip: &Trip) -> TripRow {
    TripRow {
        id: trip.id.to_string(),
        name: trip.name.clone(),
        start_date: trip.start_date,
        duration_days: trip.duration_days,
        cover_image_url: trip.cover_image_url.clone(),
        created_at: trip.created_at,
        updated_at: trip.updated_at,
    }
}

pub(super) fn trip_from_row(row: TripRow) -> Result<Trip, AppError> {
    Ok(Trip {
        id: TripId::new(row.id).map_err(AppError::Validation)?,
        name: row.name,
        start_date: row.start_date,
        duration_days: row.duration_days,
        cover_image_url: row.cover_image_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(super) fn event_to_row(event: &ItineraryEvent) -> EventRow {
    let location = event.location.as_ref();
    EventRow {
        id: event.id.to_string(),
        trip_id: event.trip_id.to_string(),
        category: event.category.as_str().to_string(),
        title: event.title.clone(),
        start_time: event.start_time.clone(),
        end_time: event.end_time.clone(),
        rating: event.rating,
        review_count: event.review_count,
        image_url: event.image_url.clone(),
        status_text: event.status_text.clone(),
        duration_text: event.duration_text.clone(),
        travel_time: event.travel_time.clone(),
        travel_distance: event.travel_distance.clone(),
        travel_mode: event.travel_mode.clone(),
        day: event.day.value(),
        sort_order: event.sort_order,
        latitude: location.map(|loc| loc.latitude),
        longitude: location.map(|loc| loc.longitude),
        place_id: location.and_then(|loc| loc.place_id.as_ref().map(|p| p.to_string())),
        address: location.and_then(|loc| loc.address.clone()),
        opening_hours: location.and_then(|loc| loc.opening_hours.clone()),
        is_day_start: event.is_day_start,
        is_day_end: event.is_day_end,
        created_at: event.created_at,
        updated_at: event.updated_at,
    }
}

pub(super) fn event_from_row(row: EventRow) -> Result<ItineraryEvent, AppError> {
    // 位置情報は緯度経度が両方そろっている行だけ復元する
    let location = match (row.latitude, row.longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
            place_id: row.place_id.and_then(|p| PlaceId::new(p).ok()),
            address: row.address,
            opening_hours: row.opening_hours,
        }),
        _ => None,
    };
    Ok(ItineraryEvent {
        id: EventId::new(row.id).map_err(AppError::Validation)?,
        trip_id: TripId::new(row.trip_id).map_err(AppError::Validation)?,
        category: row.category.parse().map_err(AppError::Validation)?,
        title: row.title,
        start_time: row.start_time,
        end_time: row.end_time,
        rating: row.rating,
        review_count: row.review_count,
        image_url: row.image_url,
        status_text: row.status_text,
        duration_text: row.duration_text,
        travel_time: row.travel_time,
        travel_distance: row.travel_distance,
        travel_mode: row.travel_mode,
        day: DayOffset::new(row.day).map_err(AppError::Validation)?,
        sort_order: row.sort_order,
        location,
        is_day_start: row.is_day_start,
        is_day_end: row.is_day_end,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(super) fn document_to_row(document: &TripDocument) -> DocumentRow {
    DocumentRow {
        id: document.id.to_string(),
        trip_id: document.trip_id.to_string(),
        title: document.title.clone(),
        category: document.category.as_str().to_string(),
        size_text: document.size_text.clone(),
        mime_type: document.mime_type.clone(),
        file_url: document.file_url.clone(),
        metadata: document.metadata.clone(),
        created_at: document.created_at,
        updated_at: document.updated_at,
    }
}

pub(super) fn document_from_row(row: DocumentRow) -> Result<TripDocument, AppError> {
    Ok(TripDocument {
        id: DocumentId::new(row.id).map_err(AppError::Validation)?,
        trip_id: TripId::new(row.trip_id).map_err(AppError::Validation)?,
        title: row.title,
        category: row.category.parse().map_err(AppError::Validation)?,
        size_text: row.size_text,
        mime_type: row.mime_type,
        file_url: row.file_url,
        metadata: row.metadata,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{DocumentCategory, EventCategory};
    use chrono::NaiveDate;

    fn sample_event() -> ItineraryEvent {
        ItineraryEvent::new(
            TripId::generate(),
            EventCategory::Play,
            "Fushimi Inari".to_string(),
            DayOffset::scheduled(0),
        )
        .with_location(GeoPoint {
            latitude: 34.9671,
            longitude: 135.7727,
            place_id: Some(PlaceId::new("ChIJ123".to_string()).unwrap()),
            address: Some("68 Fukakusa Yabunouchicho".to_string()),
            opening_hours: Some("24 hours".to_string()),
        })
        .with_sort_order(3)
    }

    #[test]
    fn test_trip_row_round_trip() {
        let trip = Trip::new(
            "Kyoto".to_string(),
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            3,
        )
        .with_cover_image("https://img.example.com/kyoto.jpg".to_string());

        let restored = trip_from_row(trip_to_row(&trip)).unwrap();
        assert_eq!(restored, trip);
    }

    #[test]
    fn test_event_row_round_trip_with_location() {
        let event = sample_event();
        let restored = event_from_row(event_to_row(&event)).unwrap();
        assert_eq!(restored, event);
    }

    #[test]
    fn test_event_row_round_trip_without_location() {
        let mut event = sample_event();
        event.location = None;
        event.day = DayOffset::UNSCHEDULED;

        let row = event_to_row(&event);
        assert_eq!(row.day, -1);
        assert!(row.latitude.is_none());
        assert!(row.place_id.is_none());

        let restored = event_from_row(row).unwrap();
        assert_eq!(restored, event);
    }

    #[test]
    fn test_event_row_rejects_unknown_category() {
        let mut row = event_to_row(&sample_event());
        row.category = "sleep".to_string();
        assert!(matches!(
            event_from_row(row),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_document_row_round_trip() {
        let document = TripDocument::new(
            TripId::generate(),
            "Shinkansen ticket".to_string(),
            DocumentCategory::Ticket,
            "220 KB".to_string(),
            "application/pdf".to_string(),
            "https://files.example.com/ticket.pdf".to_string(),
        )
        .with_metadata(serde_json::json!({ "seat": "12A" }));

        let restored = document_from_row(document_to_row(&document)).unwrap();
        assert_eq!(restored, document);
    }
}
