use crate::error::{AppError, AppResult};
use crate::models::{AstroRequest, HealthResponse, OracleRequest, RelayResponse};
use crate::relay::Relay;
use axum::{
    Extension,
    extract::{Json, rejection::JsonRejection},
    response::Json as ResponseJson,
};
use tracing::{debug, info};

/// Health check handler
/// Returns a static "alive" acknowledgment
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");
    Ok(ResponseJson(HealthResponse::ok()))
}

/// Plain-text status banner served at `/`
pub async fn banner() -> &'static str {
    "Oracle relay is running. POST /magicball or /astro, GET /health.\n"
}

/// Oracle handler: relays a free-form question to the symbolic oracle prompt
pub async fn magicball_handler(
    Extension(relay): Extension<Relay>,
    payload: Result<Json<OracleRequest>, JsonRejection>,
) -> AppResult<ResponseJson<RelayResponse>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    info!("Magicball endpoint called (lang={:?})", request.lang);

    let text = relay.magicball(&request).await?;

    info!("Oracle answered with {} chars", text.chars().count());
    Ok(ResponseJson(RelayResponse::new(text)))
}

/// Astro handler: relays a precomputed birth chart to the natal interpreter prompt
pub async fn astro_handler(
    Extension(relay): Extension<Relay>,
    payload: Result<Json<AstroRequest>, JsonRejection>,
) -> AppResult<ResponseJson<RelayResponse>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    info!("Astro endpoint called (lang={:?})", request.lang);

    let text = relay.astro(&request).await?;

    info!("Chart interpretation returned {} chars", text.chars().count());
    Ok(ResponseJson(RelayResponse::new(text)))
}
