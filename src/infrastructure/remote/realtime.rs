use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use crate::application::ports::remote_gateway::{
    ChangeCallback, RealtimeSubscription, RemoteChange,
};
use crate::shared::error::AppError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 行変更のpush通知チャネル。購読ごとに1本のWebSocketを張り、
/// トピックをサーバ側でtrip単位にフィルタさせる。
#[derive(Clone)]
pub(super) struct RealtimeChannel {
    ws_url: String,
    api_key: Option<String>,
    heartbeat_interval: Duration,
}

impl RealtimeChannel {
    pub(super) fn new(ws_url: String, api_key: Option<String>, heartbeat_interval: Duration) -> Self {
        Self {
            ws_url: ws_url.trim_end_matches('/').to_string(),
            api_key,
            heartbeat_interval,
        }
    }

    pub(super) async fn subscribe(
        &self,
        table: &str,
        filter: Option<String>,
        callback: ChangeCallback,
    ) -> Result<Box<dyn RealtimeSubscription>, AppError> {
        let topic = match &filter {
            Some(filter) => format!("realtime:public:{table}:{filter}"),
            None => format!("realtime:public:{table}"),
        };
        let url = match &self.api_key {
            Some(key) => format!("{}/realtime/v1/websocket?apikey={key}&vsn=1.0.0", self.ws_url),
            None => format!("{}/realtime/v1/websocket?vsn=1.0.0", self.ws_url),
        };

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            AppError::Connectivity(format!("realtime connect failed for {topic}: {e}"))
        })?;
        info!(%topic, "Realtime channel connected");

        let active = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(run_channel(
            ws_stream,
            topic.clone(),
            self.heartbeat_interval,
            callback,
            Arc::clone(&active),
        ));

        Ok(Box::new(ChannelSubscription {
            topic,
            active,
            task: task.abort_handle(),
        }))
    }
}

struct ChannelSubscription {
    topic: String,
    active: Arc<AtomicBool>,
    task: tokio::task::AbortHandle,
}

impl RealtimeSubscription for ChannelSubscription {
    fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            debug!(topic = %self.topic, "Realtime channel unsubscribed");
        }
        self.task.abort();
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for ChannelSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// 購読タスク本体。joinを送ってからハートビートと受信を多重化する。
async fn run_channel(
    mut ws_stream: WsStream,
    topic: String,
    heartbeat_interval: Duration,
    callback: ChangeCallback,
    active: Arc<AtomicBool>,
) {
    let join = serde_json::json!({
        "topic": topic,
        "event": "phx_join",
        "payload": {},
        "ref": "1",
    });
    if let Err(e) = ws_stream.send(Message::Text(join.to_string())).await {
        error!(%topic, error = %e, "Realtime join failed");
        active.store(false, Ordering::SeqCst);
        return;
    }

    let start = tokio::time::Instant::now() + heartbeat_interval;
    let mut heartbeat = tokio::time::interval_at(start, heartbeat_interval);
    let mut heartbeat_ref: u64 = 1;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                heartbeat_ref += 1;
                let beat = serde_json::json!({
                    "topic": "phoenix",
                    "event": "heartbeat",
                    "payload": {},
                    "ref": heartbeat_ref.to_string(),
                });
                if let Err(e) = ws_stream.send(Message::Text(beat.to_string())).await {
                    warn!(%topic, error = %e, "Realtime heartbeat failed");
                    break;
                }
            }
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => handle_frame(&topic, &text, &callback),
                    Some(Ok(Message::Close(frame))) => {
                        info!(%topic, ?frame, "Realtime channel closed by server");
                        break;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        // tungstenite側で応答済み
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(%topic, error = %e, "Realtime receive error");
                        break;
                    }
                    None => {
                        info!(%topic, "Realtime stream ended");
                        break;
                    }
                }
            }
        }
    }
    active.store(false, Ordering::SeqCst);
}

/// テキストフレーム1枚を行変更に変換してコールバックへ流す。
/// 制御フレームや形式外のフレームは握りつぶしてログだけ残す。
fn handle_frame(topic: &str, text: &str, callback: &ChangeCallback) {
    let envelope: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!(%topic, error = %e, "Ignoring malformed realtime frame");
            return;
        }
    };
    let event = envelope
        .get("event")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if event == "phx_reply" || event == "phx_close" || event == "heartbeat" {
        trace!(%topic, %event, "Realtime control frame");
        return;
    }
    let payload = match envelope.get("payload") {
        Some(payload) => payload.clone(),
        None => return,
    };
    match serde_json::from_value::<RemoteChange>(payload) {
        Ok(change) => {
            debug!(%topic, event_type = change.event_type.as_str(), "Realtime change received");
            callback(change);
        }
        Err(e) => {
            trace!(%topic, error = %e, "Realtime frame carried no row change");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::remote_gateway::RemoteChangeType;
    use std::sync::Mutex;

    fn collecting_callback() -> (ChangeCallback, Arc<Mutex<Vec<RemoteChange>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ChangeCallback = Arc::new(move |change| {
            sink.lock().unwrap().push(change);
        });
        (callback, seen)
    }

    #[test]
    fn test_handle_frame_parses_insert() {
        let (callback, seen) = collecting_callback();
        let frame = serde_json::json!({
            "topic": "realtime:public:events:trip_id=eq.t1",
            "event": "INSERT",
            "payload": {
                "eventType": "INSERT",
                "new": { "id": "e1", "trip_id": "t1" },
                "old": null,
            },
            "ref": null,
        });

        handle_frame("realtime:public:events", &frame.to_string(), &callback);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].event_type, RemoteChangeType::Insert);
        assert_eq!(seen[0].new.as_ref().unwrap()["id"], "e1");
        assert!(seen[0].old.is_none());
    }

    #[test]
    fn test_handle_frame_skips_control_and_garbage() {
        let (callback, seen) = collecting_callback();

        let reply = serde_json::json!({
            "topic": "realtime:public:trips",
            "event": "phx_reply",
            "payload": { "status": "ok" },
        });
        handle_frame("realtime:public:trips", &reply.to_string(), &callback);
        handle_frame("realtime:public:trips", "not json at all", &callback);

        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let task = tokio::spawn(async {
            futures::future::pending::<()>().await;
        });
        let subscription = ChannelSubscription {
            topic: "realtime:public:events".to_string(),
            active: Arc::new(AtomicBool::new(true)),
            task: task.abort_handle(),
        };

        assert!(subscription.is_active());
        subscription.unsubscribe();
        subscription.unsubscribe();
        assert!(!subscription.is_active());
        assert!(task.await.unwrap_err().is_cancelled());
    }
}
