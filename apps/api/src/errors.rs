use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::records::RecordError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Gateway, cache and counter-store failures never reach this type: the pipeline
/// absorbs them. `RateLimited` is the one pipeline outcome callers must handle.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Record store error: {0}")]
    Records(#[from] RecordError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Too many requests. Try again in {retry_after_secs} seconds."),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Records(RecordError::Timeout(after)) => {
                tracing::error!("Record store timed out after {after:?}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_TIMEOUT",
                    "Storage did not respond in time".to_string(),
                )
            }
            AppError::Records(e) => {
                tracing::error!("Record store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        if let AppError::RateLimited { retry_after_secs } = &self {
            body["error"]["retry_after_secs"] = json!(retry_after_secs);
            let mut response = (status, Json(body)).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
            return response;
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_sets_retry_after_header() {
        let response = AppError::RateLimited {
            retry_after_secs: 42,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("Job j1 not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn test_record_store_errors_are_server_errors() {
        let timeout = AppError::from(RecordError::Timeout(std::time::Duration::from_secs(5)));
        assert_eq!(timeout.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let db = AppError::from(RecordError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(db.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
