use super::mapper::map_event_row;
use super::queries::{
    DELETE_EVENT, DELETE_EVENTS_BY_TRIP, SELECT_EVENTS_BY_TRIP, SELECT_EVENT_BY_ID, UPSERT_EVENT,
};
use super::SqliteLocalStore;
use crate::application::ports::local_store::EventStore;
use crate::domain::entities::ItineraryEvent;
use crate::domain::value_objects::{EventId, TripId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

fn bind_event<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    event: &'q ItineraryEvent,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    let location = event.location.as_ref();
    query
        .bind(event.id.as_str())
        .bind(event.trip_id.as_str())
        .bind(event.category.as_str())
        .bind(&event.title)
        .bind(event.start_time.as_deref())
        .bind(event.end_time.as_deref())
        .bind(event.rating)
        .bind(event.review_count.map(|v| v as i64))
        .bind(event.image_url.as_deref())
        .bind(event.status_text.as_deref())
        .bind(event.duration_text.as_deref())
        .bind(event.travel_time.as_deref())
        .bind(event.travel_distance.as_deref())
        .bind(event.travel_mode.as_deref())
        .bind(event.day.value())
        .bind(event.sort_order)
        .bind(location.map(|l| l.latitude))
        .bind(location.map(|l| l.longitude))
        .bind(location.and_then(|l| l.place_id.as_ref()).map(|p| p.as_str()))
        .bind(location.and_then(|l| l.address.as_deref()))
        .bind(location.and_then(|l| l.opening_hours.as_deref()))
        .bind(event.is_day_start)
        .bind(event.is_day_end)
        .bind(event.created_at.timestamp_millis())
        .bind(event.updated_at.timestamp_millis())
}

#[async_trait]
impl EventStore for SqliteLocalStore {
    async fn get_event(&self, id: &EventId) -> Result<Option<ItineraryEvent>, AppError> {
        let row = sqlx::query(SELECT_EVENT_BY_ID)
            .bind(id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(map_event_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_events(&self, trip_id: &TripId) -> Result<Vec<ItineraryEvent>, AppError> {
        let rows = sqlx::query(SELECT_EVENTS_BY_TRIP)
            .bind(trip_id.as_str())
            .fetch_all(self.pool.get_pool())
            .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(map_event_row(&row)?);
        }
        Ok(events)
    }

    async fn put_event(&self, event: &ItineraryEvent) -> Result<(), AppError> {
        bind_event(sqlx::query(UPSERT_EVENT), event)
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn replace_events(
        &self,
        trip_id: &TripId,
        events: &[ItineraryEvent],
    ) -> Result<(), AppError> {
        // 全削除と再挿入を1トランザクションで行う
        let mut tx = self.pool.get_pool().begin().await?;

        sqlx::query(DELETE_EVENTS_BY_TRIP)
            .bind(trip_id.as_str())
            .execute(&mut *tx)
            .await?;

        for event in events {
            bind_event(sqlx::query(UPSERT_EVENT), event)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), AppError> {
        sqlx::query(DELETE_EVENT)
            .bind(id.as_str())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }
}
