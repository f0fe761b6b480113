use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::services::ServiceError;

#[derive(Debug)]
pub enum AppError {
    NotFound,
    BadRequest(String),
    /// Soft storage failure: logged, answered as a rejected request.
    Storage(sqlx::Error),
    /// A fatal failure that aborted the operation.
    Aborted(ServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Storage(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::BAD_REQUEST,
                    "Request could not be completed".to_string(),
                )
            }
            AppError::Aborted(e) => {
                tracing::error!("Operation aborted: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Storage(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(e) => AppError::BadRequest(e.to_string()),
            ServiceError::Storage(e) => AppError::Storage(e),
            fatal => AppError::Aborted(fatal),
        }
    }
}
