use axum::http::{Method, header};
use axum::{Extension, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, DEFAULT_LOG_FILTER};
use crate::relay::Relay;
use crate::routes::create_routes;

/// Initialize tracing and logging for the application
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Any origin may call the relay; `authorization` is accepted but not checked here.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create and configure the Axum application with all routes and middleware
pub fn create_app(config: &Config) -> anyhow::Result<Router> {
    info!("Initializing application router");

    let relay = Relay::new(config.upstream.clone())?;
    info!("Upstream client ready for {}", relay.config().completions_url());

    Ok(Router::new()
        .merge(create_routes())
        .layer(Extension(relay))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer()))
}
