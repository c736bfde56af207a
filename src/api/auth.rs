//! Authentication API endpoints
//!
//! Handles HTTP requests for authentication and notification:
//! - POST /api/auth/register - User registration
//! - POST /api/auth/login - User login
//! - POST /api/send-email - Send a notification email

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState};
use crate::services::{LoginInput, RegisterInput};

/// Request body for the email notification endpoint
#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// POST /api/auth/register - User registration
///
/// Responds with a sanitized user projection; the password hash is
/// never part of the body.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth_service.register(body).await?;

    Ok(Json(json!({
        "status": 200,
        "user": user,
    })))
}

/// POST /api/auth/login - User login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let (details, token) = state.auth_service.login(body).await?;

    Ok(Json(json!({
        "details": details,
        "token": token,
    })))
}

/// POST /api/send-email - Send a notification email
///
/// Delivery failures are reported with a generic error string; SMTP
/// detail stays in the logs.
pub async fn send_email(
    State(state): State<AppState>,
    Json(body): Json<SendEmailRequest>,
) -> Result<Response, ApiError> {
    if body.email.trim().is_empty() || !body.email.contains('@') {
        return Err(ApiError::bad_request("Email is invalid"));
    }

    let subject = body.subject.as_deref().unwrap_or("Notification from Newsroom");
    let message = body
        .message
        .as_deref()
        .unwrap_or("You have a new notification.");

    match state.email_service.send(&body.email, subject, message).await {
        Ok(()) => Ok(Json(json!({
            "status": 200,
            "message": "Email sent",
        }))
        .into_response()),
        Err(e) => {
            tracing::error!(error = %e, to = %body.email, "Failed to send email");
            Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": 400,
                    "message": "Failed to send email",
                    "error": "Email delivery failed",
                })),
            )
                .into_response())
        }
    }
}
