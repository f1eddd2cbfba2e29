use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::builder::{QuestionImportError, StoreError, SyncError};
use crate::workflows::quota::{CatalogError, QuotaServiceError, RepositoryError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Import(QuestionImportError),
    Quota(QuotaServiceError),
    Sync(SyncError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "invalid json: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Quota(err) => write!(f, "quota error: {}", err),
            AppError::Sync(err) => write!(f, "sync error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Quota(err) => Some(err),
            AppError::Sync(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Json(_) | AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Quota(err) => match err {
                QuotaServiceError::Validation(_)
                | QuotaServiceError::Catalog(CatalogError::MissingVendor) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                QuotaServiceError::Repository(RepositoryError::SurveyNotFound(_)) => {
                    StatusCode::NOT_FOUND
                }
                QuotaServiceError::Repository(RepositoryError::Rejected(_)) => {
                    StatusCode::BAD_REQUEST
                }
                QuotaServiceError::Catalog(CatalogError::Unavailable(_))
                | QuotaServiceError::Repository(RepositoryError::Unavailable(_)) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            AppError::Sync(err) => match err.store_error() {
                None => StatusCode::UNPROCESSABLE_ENTITY,
                Some(StoreError::NotFound(_)) => StatusCode::CONFLICT,
                Some(StoreError::Rejected(_)) => StatusCode::UNPROCESSABLE_ENTITY,
                Some(StoreError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
            },
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Quota(err) => json!({ "error": err.to_string() }),
            AppError::Sync(err) => json!({
                "error": err.to_string(),
                "hint": "reload the question list and save again",
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<QuestionImportError> for AppError {
    fn from(value: QuestionImportError) -> Self {
        Self::Import(value)
    }
}

impl From<QuotaServiceError> for AppError {
    fn from(value: QuotaServiceError) -> Self {
        Self::Quota(value)
    }
}

impl From<SyncError> for AppError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}
