//! # REST API for Tenant Management
//!
//! Tenant create and update take `multipart/form-data` so KYC scans and the
//! photo arrive together with the text fields.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, patch},
    Router,
};
use shared::{MessageResponse, TenantListRequest, TenantRequest};
use tracing::{error, info};

use super::error::ApiError;
use super::mappers::TenantMapper;
use crate::domain::models::Tenant;
use crate::domain::UploadStore;
use crate::AppState;

/// Create the tenant API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tenants).post(create_tenant))
        .route("/:id", get(get_tenant).put(update_tenant).delete(delete_tenant))
        .route("/:id/toggle-status", patch(toggle_tenant_status))
}

/// Text fields and stored upload names of a tenant form
struct TenantForm {
    request: TenantRequest,
    stored_files: Vec<String>,
}

/// Read a tenant form, storing each uploaded file as it arrives. On any
/// failure the files stored so far are removed again.
async fn read_tenant_form(store: &UploadStore, multipart: Multipart) -> Result<TenantForm, ApiError> {
    let mut stored_files = Vec::new();
    match collect_tenant_fields(store, multipart, &mut stored_files).await {
        Ok(request) => Ok(TenantForm {
            request,
            stored_files,
        }),
        Err(e) => {
            store.discard(&stored_files).await;
            Err(e)
        }
    }
}

/// Numbers that do not parse become NaN so validation reports them with the
/// other fields.
async fn collect_tenant_fields(
    store: &UploadStore,
    mut multipart: Multipart,
    stored_files: &mut Vec<String>,
) -> Result<TenantRequest, ApiError> {
    let mut request = TenantRequest {
        deposit: f64::NAN,
        monthly_rent: f64::NAN,
        ..Default::default()
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if matches!(name.as_str(), "aadhaar_file" | "pan_file" | "photo_file") {
            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
            // Browsers send an empty part for a file input left blank
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }

            let stored = store.save(&name, &file_name, &content_type, &bytes).await?;
            stored_files.push(stored.clone());
            match name.as_str() {
                "aadhaar_file" => request.aadhaar_file = Some(stored),
                "pan_file" => request.pan_file = Some(stored),
                _ => request.photo = Some(stored),
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
        match name.as_str() {
            "name" => request.name = value,
            "address" => request.address = value,
            "contact_number" => request.contact_number = value,
            "aadhaar_number" => request.aadhaar_number = value,
            "pan_number" => request.pan_number = value,
            "accommodation_from_date" => request.accommodation_from_date = value,
            "deposit" => request.deposit = value.trim().parse().unwrap_or(f64::NAN),
            "monthly_rent" => request.monthly_rent = value.trim().parse().unwrap_or(f64::NAN),
            "agreement_done" => request.agreement_done = value.trim() == "true",
            "agreement_date" => {
                request.agreement_date = Some(value).filter(|v| !v.trim().is_empty())
            }
            _ => {}
        }
    }

    Ok(request)
}

/// Upload names a successful update replaced
fn replaced_files(before: &Tenant, after: &Tenant) -> Vec<String> {
    [
        (Some(&before.aadhaar.file), Some(&after.aadhaar.file)),
        (Some(&before.pan.file), Some(&after.pan.file)),
        (before.photo.as_ref(), after.photo.as_ref()),
    ]
    .into_iter()
    .filter_map(|(old, new)| match old {
        Some(old) if !old.is_empty() && Some(old) != new => Some(old.clone()),
        _ => None,
    })
    .collect()
}

/// List tenants with search, status filter and pagination
pub async fn list_tenants(
    State(state): State<AppState>,
    Query(request): Query<TenantListRequest>,
) -> impl IntoResponse {
    info!("GET /api/tenants - request: {:?}", request);

    match state
        .tenant_service
        .list_tenants(TenantMapper::to_list_query(request))
        .await
    {
        Ok(result) => (StatusCode::OK, Json(TenantMapper::to_list_dto(result))).into_response(),
        Err(e) => {
            error!("Failed to list tenants: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Get a tenant by ID
pub async fn get_tenant(State(state): State<AppState>, Path(tenant_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/tenants/{}", tenant_id);

    match state.tenant_service.get_tenant(&tenant_id).await {
        Ok(tenant) => (StatusCode::OK, Json(TenantMapper::to_dto(tenant))).into_response(),
        Err(e) => {
            error!("Failed to get tenant {}: {}", tenant_id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Register a tenant with KYC uploads
pub async fn create_tenant(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_tenant_form(&state.upload_store, multipart).await?;
    info!("POST /api/tenants - request: {:?}", form.request);

    match state
        .tenant_service
        .create_tenant(TenantMapper::to_command(form.request))
        .await
    {
        Ok(tenant) => Ok((
            StatusCode::CREATED,
            Json(TenantMapper::to_response_dto(tenant, "Tenant created successfully")),
        )),
        Err(e) => {
            error!("Failed to create tenant: {}", e);
            state.upload_store.discard(&form.stored_files).await;
            Err(e.into())
        }
    }
}

/// Update a tenant; files not re-uploaded are kept
pub async fn update_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_tenant_form(&state.upload_store, multipart).await?;
    info!("PUT /api/tenants/{} - request: {:?}", tenant_id, form.request);

    let previous = state.tenant_service.get_tenant(&tenant_id).await.ok();
    match state
        .tenant_service
        .update_tenant(&tenant_id, TenantMapper::to_command(form.request))
        .await
    {
        Ok(tenant) => {
            if let Some(previous) = &previous {
                state.upload_store.discard(&replaced_files(previous, &tenant)).await;
            }
            Ok((
                StatusCode::OK,
                Json(TenantMapper::to_response_dto(tenant, "Tenant updated successfully")),
            ))
        }
        Err(e) => {
            error!("Failed to update tenant {}: {}", tenant_id, e);
            state.upload_store.discard(&form.stored_files).await;
            Err(e.into())
        }
    }
}

/// Soft delete: the tenant is deactivated, rent history stays
pub async fn delete_tenant(State(state): State<AppState>, Path(tenant_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/tenants/{}", tenant_id);

    match state.tenant_service.delete_tenant(&tenant_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Tenant deleted successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to delete tenant {}: {}", tenant_id, e);
            ApiError::from(e).into_response()
        }
    }
}

/// Flip a tenant between active and inactive
pub async fn toggle_tenant_status(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> impl IntoResponse {
    info!("PATCH /api/tenants/{}/toggle-status", tenant_id);

    match state.tenant_service.toggle_status(&tenant_id).await {
        Ok(tenant) => {
            let message = if tenant.is_active {
                "Tenant activated successfully"
            } else {
                "Tenant deactivated successfully"
            };
            (StatusCode::OK, Json(TenantMapper::to_response_dto(tenant, message))).into_response()
        }
        Err(e) => {
            error!("Failed to toggle tenant {}: {}", tenant_id, e);
            ApiError::from(e).into_response()
        }
    }
}
