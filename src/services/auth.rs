//! Authentication service
//!
//! Registration and login. Responses carry a sanitized user projection;
//! the stored password hash never leaves this module.

use crate::db::repositories::UserRepository;
use crate::models::{User, UserDetails};
use crate::services::password::{hash_password, verify_password};
use crate::services::token::TokenService;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Error types for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// A user with this email is already registered
    #[error("Email is exist")]
    EmailExists,

    /// No account for the given email
    #[error("User not found")]
    UserNotFound,

    /// Password did not match
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Input failed shape validation; field-keyed messages
    #[error("Validation failed")]
    Validation(HashMap<String, String>),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    #[serde(default)]
    pub profile: Option<String>,
}

/// Login input
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Authentication service
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, token_service: Arc<TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    /// Register a new user.
    ///
    /// Returns the sanitized projection of the created account. The
    /// email must not already be registered.
    pub async fn register(&self, input: RegisterInput) -> Result<UserDetails, AuthServiceError> {
        validate_register(&input)?;

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .map_err(AuthServiceError::InternalError)?
            .is_some()
        {
            return Err(AuthServiceError::EmailExists);
        }

        let password_hash = hash_password(&input.password)?;
        let user = User::new(input.name, input.email, password_hash, input.profile);

        let created = self
            .user_repo
            .create(&user)
            .await
            .map_err(AuthServiceError::InternalError)?;

        tracing::info!(user_id = created.id, "Registered new user");

        Ok(created.details())
    }

    /// Log a user in.
    ///
    /// Unknown email and wrong password are distinct failures; the HTTP
    /// layer maps them to 404 and 401 respectively.
    pub async fn login(&self, input: LoginInput) -> Result<(UserDetails, String), AuthServiceError> {
        let user = self
            .user_repo
            .get_by_email(&input.email)
            .await
            .map_err(AuthServiceError::InternalError)?
            .ok_or(AuthServiceError::UserNotFound)?;

        if !verify_password(&input.password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let token = self
            .token_service
            .issue(&user)
            .map_err(|e| AuthServiceError::InternalError(anyhow::anyhow!(e)))?;

        tracing::debug!(user_id = user.id, "User logged in");

        Ok((user.details(), token))
    }
}

fn validate_register(input: &RegisterInput) -> Result<(), AuthServiceError> {
    let mut errors = HashMap::new();

    if input.name.trim().is_empty() {
        errors.insert("name".to_string(), "Name is required".to_string());
    }
    if input.email.trim().is_empty() {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if !input.email.contains('@') {
        errors.insert("email".to_string(), "Email is invalid".to_string());
    }
    if input.password.len() < 6 {
        errors.insert(
            "password".to_string(),
            "Password must be at least 6 characters".to_string(),
        );
    }
    if input.password_confirmation != input.password {
        errors.insert(
            "password_confirmation".to_string(),
            "Passwords do not match".to_string(),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AuthServiceError::Validation(errors))
    }
}
