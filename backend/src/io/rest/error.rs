//! HTTP rendering of domain failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::DomainError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Malformed request that never reached a service
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let domain = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response();
            }
            ApiError::Domain(e) => e,
        };

        match domain {
            DomainError::Validation(errors) => {
                tracing::warn!("Validation failed: {:?}", errors);
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            DomainError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            DomainError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response()
            }
            DomainError::PreconditionFailed(msg) => {
                tracing::warn!("Precondition failed: {}", msg);
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            DomainError::ExternalService(msg) => {
                tracing::error!("Messaging transport error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": format!("Failed to send message: {}", msg) })),
                )
                    .into_response()
            }
            DomainError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Something went wrong!" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldError;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_validation_lists_field_errors() {
        let err = ApiError::from(DomainError::Validation(vec![FieldError::new(
            "month",
            "Month must be in YYYY-MM format",
        )]));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["field"], "month");
        assert_eq!(json["errors"][0]["message"], "Month must be in YYYY-MM format");
    }

    #[tokio::test]
    async fn test_status_codes() {
        let cases = [
            (DomainError::NotFound("Tenant not found".into()), StatusCode::NOT_FOUND),
            (DomainError::Conflict("exists".into()), StatusCode::CONFLICT),
            (DomainError::PreconditionFailed("not ready".into()), StatusCode::BAD_REQUEST),
            (DomainError::ExternalService("timeout".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let err = ApiError::from(DomainError::Internal(anyhow::anyhow!("disk I/O error at /var/db")));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Something went wrong!");
    }
}
