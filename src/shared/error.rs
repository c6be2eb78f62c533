use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Connectivity(_) => "CONNECTIVITY_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Remote(_) => "REMOTE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// UI表示向けの短いメッセージ（詳細はログ側に残す）
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(_) => "The requested item could not be found.".to_string(),
            AppError::Connectivity(_) => {
                "Cannot reach the server. Changes are kept on this device.".to_string()
            }
            AppError::Validation(msg) => msg.clone(),
            AppError::Storage(_) => "Failed to access local storage.".to_string(),
            AppError::Remote(_) => "The server rejected the request.".to_string(),
            AppError::Serialization(_) => "Failed to process data.".to_string(),
            AppError::Config(msg) => format!("Configuration problem: {msg}"),
            AppError::Internal(_) => "An unexpected error occurred.".to_string(),
        }
    }

    /// オフライン退避の判定に使う（transport層の失敗のみtrue）
    pub fn is_connectivity(&self) -> bool {
        matches!(self, AppError::Connectivity(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            AppError::Connectivity(err.to_string())
        } else if err.is_decode() {
            AppError::Serialization(err.to_string())
        } else {
            AppError::Remote(err.to_string())
        }
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
