use crate::handlers::{astro_handler, banner, health_check, magicball_handler};
use axum::{Router, routing::get, routing::post};

/// Creates and configures all application routes
pub fn create_routes() -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
        .route("/magicball", post(magicball_handler))
        .route("/astro", post(astro_handler))
}
