use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::application::ports::remote_gateway::{
    ChangeCallback, RealtimeSubscription, RemoteGateway,
};
use crate::domain::entities::{ItineraryEvent, Trip, TripDocument};
use crate::domain::value_objects::{DocumentId, EventId, TripId};
use crate::shared::config::{RemoteConfig, SyncConfig};
use crate::shared::error::AppError;

use super::mapper;
use super::realtime::RealtimeChannel;
use super::rows::{DocumentRow, EventRow, TripRow};

/// PostgREST互換のRESTエンドポイントを話すゲートウェイ。
/// ここがリモートのワイヤ形式を知る唯一の場所で、列名変換はmapperに任せる。
#[derive(Clone)]
pub struct RestGateway {
    rest_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
    realtime: RealtimeChannel,
}

impl RestGateway {
    pub fn new(remote: &RemoteConfig, sync: &SyncConfig) -> Result<Self, AppError> {
        let base = remote.base_url.trim().trim_end_matches('/').to_string();
        if base.is_empty() {
            return Err(AppError::Config("remote base_url is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(remote.request_timeout))
            .connect_timeout(Duration::from_secs(sync.probe_timeout))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;
        let api_key = remote.api_key.clone().filter(|k| !k.trim().is_empty());
        let realtime = RealtimeChannel::new(
            remote.websocket_url(),
            api_key.clone(),
            Duration::from_secs(sync.heartbeat_interval),
        );
        Ok(Self {
            rest_url: format!("{base}/rest/v1"),
            api_key,
            http,
            realtime,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.rest_url, path.trim_start_matches('/'));
        let builder = self.http.request(method, url);
        if let Some(key) = &self.api_key {
            builder
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}"))
        } else {
            builder
        }
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, AppError> {
        let resp = self.request(Method::GET, path).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<Vec<T>>().await?)
    }

    /// 書き込み系はPreferヘッダで更新後の行を返させる
    async fn write_rows<B, T>(
        &self,
        method: Method,
        path: &str,
        prefer: &str,
        body: &B,
    ) -> Result<Vec<T>, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(method, path)
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<Vec<T>>().await?)
    }

    async fn delete_rows(&self, path: &str) -> Result<(), AppError> {
        let resp = self.request(Method::DELETE, path).send().await?;
        // 既に存在しない行の削除は成功として扱う
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        ensure_success(resp).await.map(|_| ())
    }
}

#[async_trait]
impl RemoteGateway for RestGateway {
    async fn check_connection(&self) -> bool {
        let result = self
            .request(Method::GET, "trips?select=id&limit=1")
            .send()
            .await;
        match result {
            Ok(resp) => {
                let ok = resp.status().is_success();
                if !ok {
                    debug!(status = %resp.status(), "Connection probe rejected");
                }
                ok
            }
            Err(e) => {
                debug!(error = %e, "Connection probe failed");
                false
            }
        }
    }

    async fn fetch_trip(&self, id: &TripId) -> Result<Option<Trip>, AppError> {
        let rows: Vec<TripRow> = self
            .fetch_rows(&format!("trips?id=eq.{id}&limit=1"))
            .await?;
        rows.into_iter().next().map(mapper::trip_from_row).transpose()
    }

    async fn fetch_trips(&self) -> Result<Vec<Trip>, AppError> {
        let rows: Vec<TripRow> = self
            .fetch_rows("trips?order=start_date.asc,created_at.asc")
            .await?;
        rows.into_iter().map(mapper::trip_from_row).collect()
    }

    async fn insert_trip(&self, trip: &Trip) -> Result<Trip, AppError> {
        let rows: Vec<TripRow> = self
            .write_rows(
                Method::POST,
                "trips",
                "return=representation",
                &[mapper::trip_to_row(trip)],
            )
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Remote("insert trip returned no row".to_string()))?;
        mapper::trip_from_row(row)
    }

    async fn update_trip(&self, trip: &Trip) -> Result<Trip, AppError> {
        // 全列を送って行ごと置き換える（LWW）
        let rows: Vec<TripRow> = self
            .write_rows(
                Method::PATCH,
                &format!("trips?id=eq.{}", trip.id),
                "return=representation",
                &mapper::trip_to_row(trip),
            )
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("trip {}", trip.id)))?;
        mapper::trip_from_row(row)
    }

    async fn delete_trip(&self, id: &TripId) -> Result<(), AppError> {
        self.delete_rows(&format!("trips?id=eq.{id}")).await
    }

    async fn fetch_event(&self, id: &EventId) -> Result<Option<ItineraryEvent>, AppError> {
        let rows: Vec<EventRow> = self
            .fetch_rows(&format!("events?id=eq.{id}&limit=1"))
            .await?;
        rows.into_iter().next().map(mapper::event_from_row).transpose()
    }

    async fn fetch_events(&self, trip_id: &TripId) -> Result<Vec<ItineraryEvent>, AppError> {
        let rows: Vec<EventRow> = self
            .fetch_rows(&format!(
                "events?trip_id=eq.{trip_id}&order=day.asc,sort_order.asc,created_at.asc"
            ))
            .await?;
        rows.into_iter().map(mapper::event_from_row).collect()
    }

    async fn insert_event(&self, event: &ItineraryEvent) -> Result<ItineraryEvent, AppError> {
        let rows: Vec<EventRow> = self
            .write_rows(
                Method::POST,
                "events",
                "return=representation",
                &[mapper::event_to_row(event)],
            )
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Remote("insert event returned no row".to_string()))?;
        mapper::event_from_row(row)
    }

    async fn update_event(&self, event: &ItineraryEvent) -> Result<ItineraryEvent, AppError> {
        let rows: Vec<EventRow> = self
            .write_rows(
                Method::PATCH,
                &format!("events?id=eq.{}", event.id),
                "return=representation",
                &mapper::event_to_row(event),
            )
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("event {}", event.id)))?;
        mapper::event_from_row(row)
    }

    async fn upsert_events(
        &self,
        events: &[ItineraryEvent],
    ) -> Result<Vec<ItineraryEvent>, AppError> {
        if events.is_empty() {
            return Ok(Vec::new());
        }
        let body: Vec<EventRow> = events.iter().map(mapper::event_to_row).collect();
        let rows: Vec<EventRow> = self
            .write_rows(
                Method::POST,
                "events",
                "resolution=merge-duplicates,return=representation",
                &body,
            )
            .await?;
        rows.into_iter().map(mapper::event_from_row).collect()
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), AppError> {
        self.delete_rows(&format!("events?id=eq.{id}")).await
    }

    async fn fetch_documents(&self, trip_id: &TripId) -> Result<Vec<TripDocument>, AppError> {
        let rows: Vec<DocumentRow> = self
            .fetch_rows(&format!(
                "documents?trip_id=eq.{trip_id}&order=created_at.desc"
            ))
            .await?;
        rows.into_iter().map(mapper::document_from_row).collect()
    }

    async fn insert_document(&self, document: &TripDocument) -> Result<TripDocument, AppError> {
        let rows: Vec<DocumentRow> = self
            .write_rows(
                Method::POST,
                "documents",
                "return=representation",
                &[mapper::document_to_row(document)],
            )
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Remote("insert document returned no row".to_string()))?;
        mapper::document_from_row(row)
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<(), AppError> {
        self.delete_rows(&format!("documents?id=eq.{id}")).await
    }

    async fn subscribe_trip_changes(
        &self,
        callback: ChangeCallback,
    ) -> Result<Box<dyn RealtimeSubscription>, AppError> {
        self.realtime.subscribe("trips", None, callback).await
    }

    async fn subscribe_event_changes(
        &self,
        trip_id: &TripId,
        callback: ChangeCallback,
    ) -> Result<Box<dyn RealtimeSubscription>, AppError> {
        self.realtime
            .subscribe("events", Some(format!("trip_id=eq.{trip_id}")), callback)
            .await
    }
}

async fn ensure_success(resp: Response) -> Result<Response, AppError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => AppError::NotFound(format!("remote: {body}")),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            AppError::Validation(format!("remote rejected payload ({status}): {body}"))
        }
        _ => AppError::Remote(format!("remote error ({status}): {body}")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::AppConfig;

    fn gateway() -> RestGateway {
        let mut config = AppConfig::default();
        config.remote.base_url = "https://xyz.supabase.co/".to_string();
        config.remote.api_key = Some("anon-key".to_string());
        RestGateway::new(&config.remote, &config.sync).unwrap()
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let gw = gateway();
        assert_eq!(gw.rest_url, "https://xyz.supabase.co/rest/v1");
    }

    #[test]
    fn test_new_rejects_empty_base_url() {
        let mut config = AppConfig::default();
        config.remote.base_url = "  ".to_string();
        assert!(matches!(
            RestGateway::new(&config.remote, &config.sync),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let mut config = AppConfig::default();
        config.remote.api_key = Some("   ".to_string());
        let gw = RestGateway::new(&config.remote, &config.sync).unwrap();
        assert!(gw.api_key.is_none());
    }
}
