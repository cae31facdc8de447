use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    advisor::Advisor,
    config::Config,
    handlers::{self, AppState},
    store::Store,
    workspace::Workspace,
};

/// Start the pricing service
///
/// This function:
/// 1. Opens the snapshot store and loads the workspace
/// 2. Builds the application state and Axum router
/// 3. Binds to the configured address
/// 4. Serves requests until ctrl-c, then shuts down gracefully
pub async fn start_server(config: Config) -> Result<()> {
    let store = Store::open(&config.storage.path).await?;
    let workspace = Arc::new(Workspace::load(store).await);
    let advisor = Arc::new(Advisor::new(config.advisor.clone()));

    let state = AppState { workspace, advisor };
    let app = create_router(state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting pricing studio on {}", addr);
    info!(
        storage = %config.storage.path,
        advisor_enabled = config.advisor.enabled,
        "Configuration loaded"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/materials",
            get(handlers::materials::list_materials).post(handlers::materials::create_material),
        )
        .route(
            "/api/materials/:id",
            axum::routing::put(handlers::materials::update_material)
                .delete(handlers::materials::delete_material),
        )
        .route(
            "/api/product",
            get(handlers::product::get_product).post(handlers::product::update_product),
        )
        .route("/api/pricing", get(handlers::product::get_pricing))
        .route("/api/advice", post(handlers::advice::generate_advice))
        // Payloads are single form submissions; 1MB is generous
        .layer(DefaultBodyLimit::max(1024 * 1024))
        // The browser UI is served separately and talks to this API cross-origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received, draining connections...");
}
