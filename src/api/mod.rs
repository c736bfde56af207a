//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints for the Newsroom backend:
//! - Auth endpoints (register, login)
//! - News endpoints (paginated listing, lookup, owner-checked mutations)
//! - Email notification endpoint
//! - Metrics exposition
//! - Static serving of uploaded images

pub mod auth;
pub mod metrics;
pub mod middleware;
pub mod news;

use std::path::Path;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser, RequestStats};

/// Build the `/api` router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Mutations require a verified bearer token
    let protected_routes = Router::new()
        .route("/news", post(news::create))
        .route("/news/{id}", put(news::update))
        .route("/news/{id}", delete(news::delete))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/send-email", post(auth::send_email))
        .route("/news", get(news::list))
        .route("/news/{id}", get(news::show))
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str, upload_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .route("/metrics", get(metrics::metrics))
        // Uploaded images are served directly from disk
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}
