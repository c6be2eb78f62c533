use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// RESTエンドポイントのベースURL（例: https://xyz.supabase.co）
    pub base_url: String,
    /// 未指定ならbase_urlからws(s)スキームで導出する
    #[serde(default)]
    pub realtime_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// checkConnectionプローブのタイムアウト（秒）
    pub probe_timeout: u64,
    /// realtimeチャネルのハートビート間隔（秒）
    pub heartbeat_interval: u64,
    /// キュー再送時にリモート側更新を照合して上書きを記録するか
    pub conflict_detection: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub place_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
                connection_timeout: 30,
            },
            remote: RemoteConfig {
                base_url: "http://localhost:54321".to_string(),
                realtime_url: None,
                api_key: None,
                request_timeout: 30,
            },
            sync: SyncConfig {
                probe_timeout: 5,
                heartbeat_interval: 30,
                conflict_detection: true,
            },
            cache: CacheConfig {
                place_capacity: 256,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("SHIORI_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("SHIORI_DATABASE_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.max_connections = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("SHIORI_REMOTE_URL") {
            if !v.trim().is_empty() {
                cfg.remote.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("SHIORI_REALTIME_URL") {
            if !v.trim().is_empty() {
                cfg.remote.realtime_url = Some(v.trim().to_string());
            }
        }
        if let Ok(v) = std::env::var("SHIORI_API_KEY") {
            if !v.trim().is_empty() {
                cfg.remote.api_key = Some(v.trim().to_string());
            }
        }
        if let Ok(v) = std::env::var("SHIORI_REQUEST_TIMEOUT") {
            if let Some(value) = parse_u64(&v) {
                cfg.remote.request_timeout = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("SHIORI_PROBE_TIMEOUT") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.probe_timeout = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("SHIORI_HEARTBEAT_INTERVAL") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.heartbeat_interval = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("SHIORI_CONFLICT_DETECTION") {
            cfg.sync.conflict_detection = parse_bool(&v, cfg.sync.conflict_detection);
        }
        if let Ok(v) = std::env::var("SHIORI_PLACE_CACHE_CAPACITY") {
            if let Some(value) = parse_usize(&v) {
                cfg.cache.place_capacity = value.max(1);
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.remote.base_url.trim().is_empty() {
            return Err("Remote base_url must not be empty".to_string());
        }
        if self.remote.request_timeout == 0 {
            return Err("Remote request_timeout must be greater than 0".to_string());
        }
        if self.sync.heartbeat_interval == 0 {
            return Err("Sync heartbeat_interval must be greater than 0".to_string());
        }
        if self.cache.place_capacity == 0 {
            return Err("Cache place_capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl RemoteConfig {
    /// realtime接続先。realtime_url未指定時はbase_urlのスキームを差し替える
    pub fn websocket_url(&self) -> String {
        match &self.realtime_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let base = self.base_url.trim_end_matches('/');
                if let Some(rest) = base.strip_prefix("https://") {
                    format!("wss://{rest}")
                } else if let Some(rest) = base.strip_prefix("http://") {
                    format!("ws://{rest}")
                } else {
                    base.to_string()
                }
            }
        }
    }
}

fn default_database_url() -> String {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    let path = base.join("shiori").join("shiori.db");
    format!("sqlite:{}", path.display())
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_remote_url() {
        let mut cfg = AppConfig::default();
        cfg.remote.base_url = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_websocket_url_derived_from_base() {
        let mut cfg = AppConfig::default();
        cfg.remote.base_url = "https://xyz.supabase.co/".to_string();
        cfg.remote.realtime_url = None;
        assert_eq!(cfg.remote.websocket_url(), "wss://xyz.supabase.co");

        cfg.remote.base_url = "http://localhost:54321".to_string();
        assert_eq!(cfg.remote.websocket_url(), "ws://localhost:54321");
    }

    #[test]
    fn test_websocket_url_prefers_explicit_value() {
        let mut cfg = AppConfig::default();
        cfg.remote.realtime_url = Some("wss://realtime.example.com/".to_string());
        assert_eq!(cfg.remote.websocket_url(), "wss://realtime.example.com");
    }

    #[test]
    fn test_parse_bool_falls_back_to_default() {
        assert!(parse_bool("yes", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("garbage", true));
    }
}
