//! # Rent Manager Backend
//!
//! Tenant records, monthly rent collection and WhatsApp notifications for a
//! single property manager.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (axum REST handlers, mappers)
//!     ↓
//! Domain Layer (services, validation, models)
//!     ↓                     ↘
//! Storage Layer (sqlx)    Messaging (WhatsApp session + bridge gateway)
//! ```
//!
//! `main` builds one `AppState` and hands it to the router. Services are
//! cheap to clone; the WhatsApp session is shared behind an `Arc`.

pub mod config;
pub mod domain;
pub mod io;
pub mod messaging;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Settings;
use crate::domain::{GenerationService, NotificationService, RentService, ReportService, TenantService, UploadStore};
use crate::messaging::{HttpGateway, WhatsAppSession};
use crate::storage::{DbConnection, RentRepository, TenantRepository};

/// Room for three 5 MiB uploads plus the text fields of a tenant form
const MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub tenant_service: TenantService,
    pub rent_service: RentService,
    pub generation_service: GenerationService,
    pub notification_service: NotificationService,
    pub report_service: ReportService,
    pub upload_store: UploadStore,
    pub whatsapp: Arc<WhatsAppSession>,
}

impl AppState {
    pub fn new(db: DbConnection, whatsapp: Arc<WhatsAppSession>, settings: &Settings) -> Self {
        let tenants = TenantRepository::new(db.clone());
        let rents = RentRepository::new(db);

        let rent_service = RentService::new(rents.clone(), tenants.clone());
        Self {
            tenant_service: TenantService::new(tenants.clone()),
            generation_service: GenerationService::new(tenants.clone(), rent_service.clone()),
            notification_service: NotificationService::new(
                rents.clone(),
                tenants.clone(),
                whatsapp.clone(),
                &settings.whatsapp.currency_symbol,
            ),
            report_service: ReportService::new(rents, tenants),
            upload_store: UploadStore::new(&settings.uploads),
            rent_service,
            whatsapp,
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(settings: &Settings) -> Result<AppState> {
    info!("Setting up database at {}", settings.database.url);
    let db = DbConnection::new(&settings.database.url).await?;

    info!("Setting up WhatsApp bridge at {}", settings.whatsapp.gateway_url);
    let gateway = Arc::new(HttpGateway::new(&settings.whatsapp)?);
    let session = Arc::new(WhatsAppSession::new(gateway, &settings.whatsapp.country_code));

    info!("Setting up application state");
    let state = AppState::new(db, session, settings);
    state.upload_store.ensure_dir().await?;

    Ok(state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, settings: &Settings) -> Result<Router> {
    let origin = settings
        .server
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin {}", settings.server.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let uploads = ServeDir::new(app_state.upload_store.dir());

    Ok(Router::new()
        .nest("/api", io::rest::api_router())
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
