//! # REST API for Rent Collection
//!
//! Rent records, marking payments, monthly generation and the monthly
//! summary / overdue views that sit alongside them.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use shared::{CreateRentRequest, GenerateMonthlyRequest, MarkPaidRequest, MessageResponse, RentListRequest, UpdateRentRequest};
use tracing::{error, info};

use super::error::ApiError;
use super::mappers::RentMapper;
use crate::domain::models::BillingPeriod;
use crate::AppState;

/// Create the rent API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rent).post(create_rent))
        .route("/generate-monthly", post(generate_monthly))
        .route("/summary/:month", get(get_monthly_summary))
        .route("/overdue/list", get(list_overdue))
        .route("/:id", get(get_rent).put(update_rent).delete(delete_rent))
        .route("/:id/mark-paid", patch(mark_rent_paid))
}

/// List rent records with filters and pagination
pub async fn list_rent(State(state): State<AppState>, Query(request): Query<RentListRequest>) -> impl IntoResponse {
    info!("GET /api/rent - request: {:?}", request);

    match state
        .rent_service
        .list_rent(RentMapper::to_list_query(request), BillingPeriod::current())
        .await
    {
        Ok(result) => (StatusCode::OK, Json(RentMapper::to_list_dto(result))).into_response(),
        Err(e) => {
            error!("Failed to list rent records: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Get one rent record with its tenant
pub async fn get_rent(State(state): State<AppState>, Path(rent_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/rent/{}", rent_id);

    match state.rent_service.get_rent(&rent_id).await {
        Ok(joined) => (StatusCode::OK, Json(RentMapper::to_detail_dto(joined))).into_response(),
        Err(e) => {
            error!("Failed to get rent record {}: {}", rent_id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Create a rent record
pub async fn create_rent(
    State(state): State<AppState>,
    Json(request): Json<CreateRentRequest>,
) -> impl IntoResponse {
    info!("POST /api/rent - request: {:?}", request);

    match state.rent_service.create_rent(RentMapper::to_create_command(request)).await {
        Ok(joined) => (
            StatusCode::CREATED,
            Json(RentMapper::to_response_dto(joined, "Rent record created successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to create rent record: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Update amounts, method and notes of a rent record
pub async fn update_rent(
    State(state): State<AppState>,
    Path(rent_id): Path<String>,
    Json(request): Json<UpdateRentRequest>,
) -> impl IntoResponse {
    info!("PUT /api/rent/{} - request: {:?}", rent_id, request);

    match state
        .rent_service
        .update_rent(&rent_id, RentMapper::to_update_command(request))
        .await
    {
        Ok(joined) => (
            StatusCode::OK,
            Json(RentMapper::to_response_dto(joined, "Rent record updated successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to update rent record {}: {}", rent_id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Mark a rent record paid; the body is optional
pub async fn mark_rent_paid(
    State(state): State<AppState>,
    Path(rent_id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let request = match parse_mark_paid(&body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    info!("PATCH /api/rent/{}/mark-paid - request: {:?}", rent_id, request);

    match state.rent_service.mark_paid(&rent_id, request.payment_method).await {
        Ok(joined) => (
            StatusCode::OK,
            Json(RentMapper::to_response_dto(joined, "Rent marked as paid")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to mark rent record {} paid: {}", rent_id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// An empty body means "keep the current method"; anything else must be valid JSON
fn parse_mark_paid(body: &[u8]) -> Result<MarkPaidRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(MarkPaidRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid mark-paid body: {}", e)))
}

/// Hard delete a rent record
pub async fn delete_rent(State(state): State<AppState>, Path(rent_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/rent/{}", rent_id);

    match state.rent_service.delete_rent(&rent_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Rent record deleted successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to delete rent record {}: {}", rent_id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Create pending records for every active tenant for a month
pub async fn generate_monthly(
    State(state): State<AppState>,
    Json(request): Json<GenerateMonthlyRequest>,
) -> impl IntoResponse {
    info!("POST /api/rent/generate-monthly - request: {:?}", request);

    match state.generation_service.generate_monthly(&request.month).await {
        Ok(report) => (StatusCode::OK, Json(RentMapper::to_generation_dto(report))).into_response(),
        Err(e) => {
            error!("Failed to generate rent records for {}: {}", request.month, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Totals and status breakdown for one month
pub async fn get_monthly_summary(State(state): State<AppState>, Path(month): Path<String>) -> impl IntoResponse {
    info!("GET /api/rent/summary/{}", month);

    match state
        .report_service
        .monthly_summary(&month, BillingPeriod::current())
        .await
    {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!("Failed to build summary for {}: {}", month, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Pending records from months before the current one
pub async fn list_overdue(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/rent/overdue/list");

    match state.report_service.overdue(BillingPeriod::current()).await {
        Ok(records) => {
            let items: Vec<_> = records.into_iter().map(RentMapper::to_list_item_dto).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => {
            error!("Failed to list overdue rent records: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
