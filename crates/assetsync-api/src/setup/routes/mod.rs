//! Route configuration and setup.
//!
//! Health check lives in [health](health).

mod health;

use crate::api_doc::get_openapi_spec;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{any, get, post},
    Json, Router,
};
use assetsync_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit,
        max_request_body_bytes = config.server.max_request_body_bytes,
        "Request limit layers enabled"
    );

    let body_limit = config.server.max_request_body_bytes;
    let app = upload_routes(body_limit)
        .merge(
            sync_routes()
                .merge(public_routes(state.clone()))
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let origins: Vec<String> = std::env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "*".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let cors = if origins.iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS_ORIGINS entry: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Oversized upload bodies are answered through the upload response format.
fn upload_routes(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload/image", any(handlers::upload::upload_image))
        .route("/upload/file", any(handlers::upload::upload_file))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(axum::middleware::map_response(
            handlers::upload::body_limit_as_outcome,
        ))
}

fn sync_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/sync/remove",
        post(handlers::sync_remove::remove_remote_file),
    )
}

fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/health",
            get({
                let state = state.clone();
                move || {
                    let state = state.clone();
                    async { health::health_check(state).await }
                }
            }),
        )
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(get_openapi_spec()) }),
        )
}
