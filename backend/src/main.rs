use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rent_manager_backend::config::Settings;
use rent_manager_backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG may come from .env
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rent_manager_backend=debug")),
        )
        .init();

    let settings = Settings::load()?;
    let app_state = initialize_backend(&settings).await?;
    let app = create_router(app_state, &settings)?;

    let addr = settings.bind_address()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Tenant Management API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
