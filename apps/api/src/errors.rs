use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::metrics::MetricsError;
use crate::resources::rows::MatrixError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl From<MetricsError> for AppError {
    fn from(err: MetricsError) -> Self {
        match err {
            MetricsError::InvalidMonth(_) | MetricsError::InvalidDate(_) => {
                AppError::Validation(err.to_string())
            }
            MetricsError::Store(e) => AppError::Store(e),
        }
    }
}

fn store_status(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        StoreError::Database(e) => {
            tracing::error!("Database error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
            )
        }
        StoreError::Corrupt { .. } => {
            tracing::error!("{err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Stored data could not be read".to_string(),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Store(e) => store_status(e),
            AppError::Matrix(MatrixError::DataUnavailable(e)) => {
                tracing::warn!("Matrix data unavailable: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "DATA_UNAVAILABLE",
                    "Planning data is temporarily unavailable".to_string(),
                )
            }
            AppError::Matrix(e @ MatrixError::InvalidYear(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Matrix(e @ MatrixError::MalformedHierarchy(_)) => {
                tracing::error!("{e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_HIERARCHY",
                    "The resource matrix could not be assembled".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::rows::HierarchyDefect;

    #[test]
    fn test_status_per_variant() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Llm("boom".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::Store(StoreError::NotFound {
                    entity: "Project",
                    id: "p-9".into(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Matrix(MatrixError::InvalidYear(0)),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Matrix(MatrixError::DataUnavailable(StoreError::Corrupt {
                    entity: "Project",
                    id: "p-1".into(),
                    reason: "bad plan".into(),
                })),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Matrix(MatrixError::MalformedHierarchy(
                    HierarchyDefect::DuplicateRowId("p-1".into()),
                )),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_invalid_month_maps_to_validation() {
        let err: AppError = MetricsError::InvalidMonth("2025-13".into()).into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
