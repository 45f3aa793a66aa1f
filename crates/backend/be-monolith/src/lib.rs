use axum::http::HeaderValue;
use be_auth_core::JwtConfig;
use be_payment_service::init_payment_service;
use be_pricing::{PricingCatalog, SharedCatalog};
use be_pricing_service::init_pricing_service;
use be_remote_db::DatabaseManager;
use be_subscription_service::init_subscription_service;
use parking_lot::RwLock;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Configuration for running the monolith server.
pub struct ServerConfig {
    pub database_url: String,
    pub http_addr: SocketAddr,
    /// When this receiver gets a value, the server shuts down gracefully.
    pub shutdown: tokio::sync::watch::Receiver<()>,
}

fn build_cors() -> CorsLayer {
    let allowed: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "https://www.schoolstack.in,https://app.schoolstack.in".into())
        .split(',')
        .filter_map(|s| {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<HeaderValue>().ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub async fn run_server(
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let db_manager = Arc::new(DatabaseManager::new(&config.database_url).await?);

    let jwt_config = Arc::new(JwtConfig::default());
    let catalog: SharedCatalog = Arc::new(RwLock::new(PricingCatalog::default()));

    tracing::info!("Starting HTTP server at {}", config.http_addr);

    let pricing_router = init_pricing_service(catalog.clone(), jwt_config.clone())?;
    let payment_router = init_payment_service(db_manager.clone(), catalog.clone())?;
    let subscription_router = init_subscription_service(db_manager.clone(), jwt_config.clone())?;

    let health_route = axum::Router::new().route(
        "/health",
        axum::routing::get(|| async { axum::http::StatusCode::OK }),
    );

    let http_router = pricing_router
        .merge(payment_router)
        .merge(subscription_router)
        .merge(health_route)
        .layer(build_cors());

    let mut http_shutdown = config.shutdown.clone();
    let http_listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    axum::serve(
        http_listener,
        http_router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = http_shutdown.changed().await;
        tracing::info!("Shutting down HTTP server...");
    })
    .await?;

    Ok(())
}
