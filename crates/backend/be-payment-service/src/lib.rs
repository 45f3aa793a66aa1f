use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use be_pricing::SharedCatalog;
use be_remote_db::DatabaseManager;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

pub mod error;
pub mod handlers;
pub mod service;
pub mod types;
pub mod webhook;

use service::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let checkout_governor = GovernorConfigBuilder::default()
        .per_second(6)
        .burst_size(10)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("valid governor config");

    let jwt_config = state.jwt_config.clone();

    let checkout_route = Router::new()
        .route("/payment/create-order", post(handlers::create_order))
        .layer(GovernorLayer::new(Arc::new(checkout_governor)));

    let authed_routes = Router::new()
        .route("/payment/verify", post(handlers::verify_payment))
        .route("/payment/history", get(handlers::payment_history));

    let webhook_route = Router::new().route("/payment/webhook", post(webhook::handle_webhook));

    checkout_route
        .merge(authed_routes)
        .merge(webhook_route)
        .layer(Extension(jwt_config))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn init_payment_service(db: Arc<DatabaseManager>, catalog: SharedCatalog) -> Result<Router> {
    debug!("Initializing payment service");

    let state =
        Arc::new(AppState::from_env(db, catalog).context("Failed to create payment service state")?);

    Ok(create_router(state))
}

pub use error::PaymentError;
pub use types::{
    CreateOrderRequest, CreateOrderResponse, PaymentHistoryResponse, SubscriptionSummary,
    VerifyPaymentRequest, VerifyPaymentResponse,
};
