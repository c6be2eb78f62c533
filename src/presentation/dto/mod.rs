// DTOモジュール
pub mod document;
pub mod event;
pub mod place;
pub mod sync;
pub mod trip;

// 共通のレスポンス型
use crate::shared::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
        }
    }

    pub fn from_app_error(error: AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.user_message()),
            error_code: Some(error.code().to_string()),
        }
    }

    pub fn from_result(result: crate::shared::Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::from_app_error(err),
        }
    }
}

// バリデーショントレイト
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_carries_data() {
        let response = ApiResponse::success(42);
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert!(response.error.is_none());
        assert!(response.error_code.is_none());
    }

    #[test]
    fn test_error_response_carries_code_and_message() {
        let response: ApiResponse<()> =
            ApiResponse::from_app_error(AppError::NotFound("trip x".to_string()));
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error_code.as_deref(), Some("NOT_FOUND"));
        assert!(response.error.is_some());
    }
}
