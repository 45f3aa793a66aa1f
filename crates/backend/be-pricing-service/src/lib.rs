use std::sync::Arc;

use anyhow::Result;
use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use be_auth_core::JwtConfig;
use be_pricing::SharedCatalog;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub mod error;
pub mod handlers;
pub mod service;

use service::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let jwt_config = state.jwt_config.clone();

    let public_routes = Router::new()
        .route("/pricing/calculate", post(handlers::calculate_price))
        .route("/pricing/portals", get(handlers::list_portals))
        .route("/pricing/features", get(handlers::list_features))
        .route("/pricing/bundles", get(handlers::list_bundles))
        .route("/pricing/page", get(handlers::pricing_page));

    let admin_routes = Router::new().route(
        "/admin/pricing",
        get(handlers::get_catalog).put(handlers::update_catalog),
    );

    public_routes
        .merge(admin_routes)
        .layer(Extension(jwt_config))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn init_pricing_service(catalog: SharedCatalog, jwt_config: Arc<JwtConfig>) -> Result<Router> {
    debug!("Initializing pricing service");

    let state = Arc::new(AppState {
        catalog,
        jwt_config,
    });

    Ok(create_router(state))
}

pub use error::PricingError;
