use std::sync::Arc;

use anyhow::Result;
use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use be_auth_core::JwtConfig;
use be_remote_db::DatabaseManager;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub mod error;
pub mod handlers;
pub mod service;

use service::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let jwt_config = state.jwt_config.clone();

    Router::new()
        .route("/user/subscription", get(handlers::get_subscription))
        .route(
            "/user/subscription/auto-renew",
            patch(handlers::toggle_auto_renew),
        )
        .route(
            "/user/subscription/cancel",
            post(handlers::cancel_subscription),
        )
        .layer(Extension(jwt_config))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn init_subscription_service(
    db: Arc<DatabaseManager>,
    jwt_config: Arc<JwtConfig>,
) -> Result<Router> {
    debug!("Initializing subscription service");

    let state = Arc::new(AppState { db, jwt_config });

    Ok(create_router(state))
}

pub use error::SubscriptionError;
