use super::mapper::map_trip_row;
use super::queries::{DELETE_TRIP, SELECT_ALL_TRIPS, SELECT_TRIP_BY_ID, UPSERT_TRIP};
use super::SqliteLocalStore;
use crate::application::ports::local_store::TripStore;
use crate::domain::entities::Trip;
use crate::domain::value_objects::TripId;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
impl TripStore for SqliteLocalStore {
    async fn get_trip(&self, id: &TripId) -> Result<Option<Trip>, AppError> {
        let row = sqlx::query(SELECT_TRIP_BY_ID)
            .bind(id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(map_trip_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_trips(&self) -> Result<Vec<Trip>, AppError> {
        let rows = sqlx::query(SELECT_ALL_TRIPS)
            .fetch_all(self.pool.get_pool())
            .await?;

        let mut trips = Vec::with_capacity(rows.len());
        for row in rows {
            trips.push(map_trip_row(&row)?);
        }
        Ok(trips)
    }

    async fn put_trip(&self, trip: &Trip) -> Result<(), AppError> {
        sqlx::query(UPSERT_TRIP)
            .bind(trip.id.as_str())
            .bind(&trip.name)
            .bind(trip.start_date.to_string())
            .bind(trip.duration_days as i64)
            .bind(trip.cover_image_url.as_deref())
            .bind(trip.created_at.timestamp_millis())
            .bind(trip.updated_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn delete_trip(&self, id: &TripId) -> Result<(), AppError> {
        sqlx::query(DELETE_TRIP)
            .bind(id.as_str())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }
}
