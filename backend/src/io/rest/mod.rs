//! # REST API Interface Layer
//!
//! JSON over HTTP under `/api`, one module per resource. Every handler logs
//! the request line, calls a single service operation and renders the result
//! through a mapper or `ApiError`.

pub mod error;
pub mod mappers;
pub mod rent_apis;
pub mod report_apis;
pub mod tenant_apis;
pub mod whatsapp_apis;

use axum::{response::Json, routing::get, Router};
use shared::HealthResponse;
use tracing::info;

use crate::AppState;

pub use error::ApiError;

/// All `/api` routes
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/tenants", tenant_apis::router())
        .nest("/rent", rent_apis::router())
        .nest("/reports", report_apis::router())
        .nest("/whatsapp", whatsapp_apis::router())
}

pub async fn health() -> Json<HealthResponse> {
    info!("GET /api/health");

    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Tenant Management API is running".to_string(),
    })
}
