//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Profile picture URL
    pub profile: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed. Use
    /// `services::password::hash_password()`.
    pub fn new(name: String, email: String, password_hash: String, profile: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            name,
            email,
            password_hash,
            profile,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sanitized projection for API responses.
    pub fn details(&self) -> UserDetails {
        UserDetails {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            profile: self.profile.clone(),
        }
    }
}

/// Public user projection. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetails {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile: Option<String>,
}
