use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Failures raised by a [`crate::logs::LogStore`].
#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("{0}")]
    Validation(String),

    #[error("log entry {0} not found")]
    NotFound(Uuid),

    #[error("log store unavailable: {0}")]
    Persistence(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum FoodLookupError {
    #[error("food item `{0}` not found")]
    NotFound(String),
}

/// Transport-level error; every handler returns this.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Service is starting")]
    NotReady,

    #[error("Server Error")]
    Internal(anyhow::Error),
}

impl From<LogStoreError> for AppError {
    fn from(e: LogStoreError) -> Self {
        match e {
            LogStoreError::Validation(msg) => AppError::BadRequest(msg),
            LogStoreError::NotFound(_) => AppError::NotFound("Log not found".into()),
            LogStoreError::Persistence(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<FoodLookupError> for AppError {
    fn from(e: FoodLookupError) -> Self {
        match e {
            FoodLookupError::NotFound(_) => AppError::NotFound("Food item not found".into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({ "msg": self.to_string() }))).into_response()
    }
}
