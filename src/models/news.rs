//! News article model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// News article entity with its author projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// Article body
    pub content: String,
    /// Category label
    pub category: String,
    /// Stored image filename
    pub image: String,
    /// Owner user ID
    pub user_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Author projection joined from the users table
    pub author: AuthorInfo,
}

/// Public author projection embedded in article reads.
///
/// Deliberately excludes the author's email and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub id: i64,
    pub name: String,
    pub profile: Option<String>,
}

/// Input for creating a news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNewsInput {
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: String,
    pub user_id: i64,
}

/// Input for updating a news article.
///
/// The owner is immutable; `image` is only set when a replacement
/// file was uploaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNewsInput {
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<String>,
}
