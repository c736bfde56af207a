//! API middleware
//!
//! Contains the shared application state, the bearer-token auth gate,
//! the API error type with its legacy-compatible JSON bodies, and the
//! request statistics middleware backing `/metrics`.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::services::auth::AuthServiceError;
use crate::services::image::ImageError;
use crate::services::news::NewsServiceError;
use crate::services::token::Claims;
use crate::services::{AuthService, EmailService, NewsService, TokenService};

// ============================================================================
// Request Statistics
// ============================================================================

/// Lightweight request statistics using atomic operations (no locks)
pub struct RequestStats {
    /// Total number of requests processed
    total_requests: AtomicU64,
    /// Total response time in microseconds (for calculating average)
    total_response_time_us: AtomicU64,
    /// Application start time
    start_time: Instant,
}

impl RequestStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a request with its response time
    pub fn record(&self, duration_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us.fetch_add(duration_us, Ordering::Relaxed);
    }

    /// Get total request count
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Get average response time in microseconds
    pub fn avg_response_time_us(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let total_time = self.total_response_time_us.load(Ordering::Relaxed);
        total_time as f64 / total as f64
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub news_service: Arc<NewsService>,
    pub email_service: Arc<EmailService>,
    pub token_service: Arc<TokenService>,
    pub request_stats: Arc<RequestStats>,
}

/// Authenticated identity extracted from a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(ApiError::unauthorized_gate)
    }
}

/// API error carrying the exact status and JSON body the client sees.
///
/// Several bodies are fixed wire contracts inherited from earlier
/// clients (duplicate email, login failures, the auth gate rejection)
/// and must not be reworded.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    /// Auth gate rejection. The body shape is a fixed client contract.
    pub fn unauthorized_gate() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: json!({ "status": 401, "messages": "UnAuthorized" }),
        }
    }

    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            body: json!({ "error": "Forbidden" }),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn validation(errors: HashMap<String, String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "errors": errors }),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "error": message.into() }),
        }
    }

    /// Generic 500. Internal detail is logged, never sent to clients.
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({ "error": "Internal server error" }),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::EmailExists => Self {
                status: StatusCode::BAD_REQUEST,
                body: json!({ "error": { "email": "Email is exist" } }),
            },
            AuthServiceError::UserNotFound => Self {
                status: StatusCode::NOT_FOUND,
                body: json!({ "error": "User not found" }),
            },
            AuthServiceError::InvalidCredentials => Self {
                status: StatusCode::UNAUTHORIZED,
                body: json!({ "error": "Invalid credentials" }),
            },
            AuthServiceError::Validation(errors) => Self::validation(errors),
            AuthServiceError::InternalError(e) => {
                tracing::error!(error = %e, "Auth service error");
                Self::internal()
            }
        }
    }
}

impl From<NewsServiceError> for ApiError {
    fn from(err: NewsServiceError) -> Self {
        match err {
            NewsServiceError::NotFound => Self::not_found("News not found"),
            NewsServiceError::Forbidden => Self::forbidden(),
            NewsServiceError::Validation(errors) => Self::validation(errors),
            NewsServiceError::Image(e) => Self::from(e),
            NewsServiceError::InternalError(e) => {
                tracing::error!(error = %e, "News service error");
                Self::internal()
            }
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::InternalError(e) => {
                tracing::error!(error = %e, "Image storage error");
                Self::internal()
            }
            other => {
                let mut errors = HashMap::new();
                errors.insert("image".to_string(), other.to_string());
                Self::validation(errors)
            }
        }
    }
}

/// Extract the bearer token from the Authorization header.
///
/// Legacy clients send the raw token without a scheme; newer ones use
/// `Bearer <token>`. Both are accepted.
fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request.headers().get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Authentication middleware for protected routes
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&request).ok_or_else(ApiError::unauthorized_gate)?;

    let claims = state
        .token_service
        .verify(&token)
        .map_err(|_| ApiError::unauthorized_gate())?;

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}

/// Request statistics middleware
///
/// Records request count and response time for `/metrics`.
pub async fn request_stats_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_us = start.elapsed().as_micros() as u64;
    state.request_stats.record(duration_us);

    response
}

// ============================================================================
// Tests
// ============================================================================
