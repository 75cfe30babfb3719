//! Route definitions and router construction.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AppContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Uploads above this size are rejected before reaching the handler.
const UPLOAD_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// All API routes without the `/api` prefix (for nesting under `/api`).
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::speech::generate))
        .route("/generate/status", get(handlers::speech::generate_status))
        .route(
            "/transcribe",
            post(handlers::transcribe::start).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route("/transcribe/status", get(handlers::transcribe::status))
        .route("/history", get(handlers::speech::history))
        .route("/voices", get(handlers::speech::voices))
}

/// Create the main router with API routes and artifact serving.
pub fn create_router(ctx: AppContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    let audio = Router::new()
        .route("/audio/{filename}", get(handlers::audio::artifact))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors))
        .merge(audio)
        .layer(TraceLayer::new_for_http())
}

/// Create a router that also serves the static web page.
///
/// API routes take priority; unmatched paths fall back to static assets
/// with `index.html` as the final fallback, so `/` serves the page.
pub fn create_spa_router<P: AsRef<Path>>(
    ctx: AppContext,
    static_dir: P,
    cors_config: &CorsConfig,
) -> Router {
    let static_path = static_dir.as_ref();
    let index_path = static_path.join("index.html");

    let serve_dir = ServeDir::new(static_path).fallback(ServeFile::new(&index_path));

    create_router(ctx, cors_config).fallback_service(serve_dir)
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
