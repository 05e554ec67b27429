//! # REST API for WhatsApp Notifications
//!
//! Session status, pairing code, message sends and the event intake the
//! bridge uses to report session changes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use shared::{BulkReminderRequest, CustomMessageRequest, MessageResponse, QrCodeResponse, TransportEvent, WhatsAppStatusResponse};
use tracing::{error, info};

use super::error::ApiError;
use super::mappers::MessageMapper;
use crate::AppState;

/// Create the WhatsApp API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/qr", get(get_qr_code))
        .route("/send-reminder/:rent_id", post(send_reminder))
        .route("/send-bulk-reminders", post(send_bulk_reminders))
        .route("/send-payment-confirmation/:rent_id", post(send_payment_confirmation))
        .route("/send-custom-message", post(send_custom_message))
        .route("/history/:tenant_id", get(get_message_history))
        .route("/logout", post(logout))
        .route("/events", post(receive_event))
}

pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/whatsapp/status");

    let status = state.whatsapp.status().await;
    Json(WhatsAppStatusResponse {
        is_ready: status.is_ready,
        has_qr: status.has_qr,
        state: status.state.to_string(),
    })
}

/// Pairing code waiting to be scanned, if any
pub async fn get_qr_code(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/whatsapp/qr");

    match state.whatsapp.qr_code().await {
        Some(qr_code) => (StatusCode::OK, Json(QrCodeResponse { qr_code })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "QR code not available" }))).into_response(),
    }
}

pub async fn send_reminder(State(state): State<AppState>, Path(rent_id): Path<String>) -> impl IntoResponse {
    info!("POST /api/whatsapp/send-reminder/{}", rent_id);

    match state.notification_service.send_reminder(&rent_id).await {
        Ok(delivery) => (
            StatusCode::OK,
            Json(MessageMapper::to_send_dto(delivery, "Rent reminder sent successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to send rent reminder for {}: {}", rent_id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Remind every pending, not yet notified record of a month
pub async fn send_bulk_reminders(
    State(state): State<AppState>,
    Json(request): Json<BulkReminderRequest>,
) -> impl IntoResponse {
    info!("POST /api/whatsapp/send-bulk-reminders - request: {:?}", request);

    match state.notification_service.send_bulk_reminders(&request.month).await {
        Ok(report) => (StatusCode::OK, Json(MessageMapper::to_bulk_dto(report))).into_response(),
        Err(e) => {
            error!("Failed to send bulk reminders for {}: {}", request.month, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn send_payment_confirmation(
    State(state): State<AppState>,
    Path(rent_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/whatsapp/send-payment-confirmation/{}", rent_id);

    match state.notification_service.send_payment_confirmation(&rent_id).await {
        Ok(delivery) => (
            StatusCode::OK,
            Json(MessageMapper::to_send_dto(delivery, "Payment confirmation sent successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to send payment confirmation for {}: {}", rent_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn send_custom_message(
    State(state): State<AppState>,
    Json(request): Json<CustomMessageRequest>,
) -> impl IntoResponse {
    info!("POST /api/whatsapp/send-custom-message - tenant: {}", request.tenant_id);

    match state
        .notification_service
        .send_custom_message(&request.tenant_id, &request.message)
        .await
    {
        Ok(delivery) => (
            StatusCode::OK,
            Json(MessageMapper::to_send_dto(delivery, "Custom message sent successfully")),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to send custom message to {}: {}", request.tenant_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_message_history(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/whatsapp/history/{}", tenant_id);

    match state.notification_service.message_history(&tenant_id).await {
        Ok(entries) => {
            let history: Vec<_> = entries.into_iter().map(MessageMapper::to_history_dto).collect();
            (StatusCode::OK, Json(history)).into_response()
        }
        Err(e) => {
            error!("Failed to load message history for {}: {}", tenant_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/whatsapp/logout");

    match state.whatsapp.logout().await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "WhatsApp client logged out successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to log out WhatsApp client: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Session change reported by the bridge
pub async fn receive_event(State(state): State<AppState>, Json(event): Json<TransportEvent>) -> impl IntoResponse {
    info!("POST /api/whatsapp/events - event: {:?}", event);

    state.whatsapp.apply_event(event).await;
    StatusCode::NO_CONTENT
}
