//! News service
//!
//! Listing with a read-through cache, and ownership-checked create,
//! update, and delete. Every write invalidates the listing cache so
//! the next read reflects it; a failed invalidation is logged and the
//! write still succeeds, bounded by the cache TTL.

use crate::cache::{CacheLayer, MemoryCache};
use crate::db::repositories::NewsRepository;
use crate::models::{CreateNewsInput, ListParams, NewsArticle, PagedResult, UpdateNewsInput};
use crate::services::image::{ImageError, ImageStorage};
use crate::services::token::Claims;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Prefix shared by all listing cache keys
const LIST_CACHE_PREFIX: &str = "news:list:";

fn list_cache_key(params: &ListParams) -> String {
    format!("{}{}:{}", LIST_CACHE_PREFIX, params.page, params.per_page)
}

/// Error types for news operations
#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    #[error("News not found")]
    NotFound,

    /// The requester does not own the article
    #[error("Forbidden")]
    Forbidden,

    /// Input failed shape validation; field-keyed messages
    #[error("Validation failed")]
    Validation(HashMap<String, String>),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Text fields of an article, shared by create and update
#[derive(Debug, Clone, Deserialize)]
pub struct NewsInput {
    pub title: String,
    pub content: String,
    pub category: String,
}

/// News service
pub struct NewsService {
    repo: Arc<dyn NewsRepository>,
    cache: Arc<MemoryCache>,
    images: Arc<ImageStorage>,
    cache_ttl: Duration,
}

impl NewsService {
    pub fn new(
        repo: Arc<dyn NewsRepository>,
        cache: Arc<MemoryCache>,
        images: Arc<ImageStorage>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            cache,
            images,
            cache_ttl,
        }
    }

    /// List articles, newest first, through the cache.
    ///
    /// Each `(page, limit)` pair has its own cache slot. A page beyond
    /// the end is an empty result, not an error.
    pub async fn list(&self, params: ListParams) -> Result<PagedResult<NewsArticle>, NewsServiceError> {
        let key = list_cache_key(&params);

        match self.cache.get::<PagedResult<NewsArticle>>(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Listing cache hit");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Listing cache read failed");
            }
        }

        let items = self
            .repo
            .list(params.offset() as i64, params.limit() as i64)
            .await?;
        let total = self.repo.count().await? as u64;
        let result = PagedResult::new(items, total, params);

        if let Err(e) = self.cache.set(&key, &result, self.cache_ttl).await {
            tracing::warn!(key = %key, error = %e, "Failed to cache listing");
        }

        Ok(result)
    }

    /// Get a single article by ID
    pub async fn get(&self, id: i64) -> Result<NewsArticle, NewsServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(NewsServiceError::NotFound)
    }

    /// Create an article owned by the requester.
    ///
    /// The image is required and is stored before the row is written.
    pub async fn create(
        &self,
        claims: &Claims,
        input: NewsInput,
        image_data: &[u8],
        image_type: &str,
    ) -> Result<NewsArticle, NewsServiceError> {
        validate_input(&input)?;

        let image = self.images.save(image_data, image_type).await?;

        let article = self
            .repo
            .create(&CreateNewsInput {
                title: input.title,
                content: input.content,
                category: input.category,
                image,
                user_id: claims.sub,
            })
            .await?;

        tracing::info!(article_id = article.id, user_id = claims.sub, "Created article");
        self.invalidate_list_cache().await;

        Ok(article)
    }

    /// Update an article. Only the owner may update; the owner itself
    /// is immutable. When a replacement image is supplied the old file
    /// is removed after the row is written.
    pub async fn update(
        &self,
        claims: &Claims,
        id: i64,
        input: NewsInput,
        image: Option<(&[u8], &str)>,
    ) -> Result<NewsArticle, NewsServiceError> {
        validate_input(&input)?;

        let existing = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(NewsServiceError::NotFound)?;

        if existing.user_id != claims.sub {
            return Err(NewsServiceError::Forbidden);
        }

        let new_image = match image {
            Some((data, content_type)) => Some(self.images.save(data, content_type).await?),
            None => None,
        };

        let updated = self
            .repo
            .update(
                id,
                &UpdateNewsInput {
                    title: input.title,
                    content: input.content,
                    category: input.category,
                    image: new_image.clone(),
                },
            )
            .await?;

        if new_image.is_some() {
            if let Err(e) = self.images.remove(&existing.image).await {
                tracing::warn!(file = %existing.image, error = %e, "Failed to remove replaced image");
            }
        }

        tracing::info!(article_id = id, user_id = claims.sub, "Updated article");
        self.invalidate_list_cache().await;

        Ok(updated)
    }

    /// Delete an article. Only the owner may delete. The stored image
    /// is removed best-effort.
    pub async fn delete(&self, claims: &Claims, id: i64) -> Result<(), NewsServiceError> {
        let existing = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(NewsServiceError::NotFound)?;

        if existing.user_id != claims.sub {
            return Err(NewsServiceError::Forbidden);
        }

        if let Err(e) = self.images.remove(&existing.image).await {
            tracing::warn!(file = %existing.image, error = %e, "Failed to remove article image");
        }

        self.repo.delete(id).await?;

        tracing::info!(article_id = id, user_id = claims.sub, "Deleted article");
        self.invalidate_list_cache().await;

        Ok(())
    }

    /// Drop every cached listing page. Best-effort: staleness after a
    /// failure here is bounded by the cache TTL.
    async fn invalidate_list_cache(&self) {
        if let Err(e) = self.cache.delete_prefix(LIST_CACHE_PREFIX).await {
            tracing::warn!(error = %e, "Failed to invalidate listing cache");
        }
    }
}

fn validate_input(input: &NewsInput) -> Result<(), NewsServiceError> {
    let mut errors = HashMap::new();

    if input.title.trim().is_empty() {
        errors.insert("title".to_string(), "Title is required".to_string());
    }
    if input.content.trim().is_empty() {
        errors.insert("content".to_string(), "Content is required".to_string());
    }
    if input.category.trim().is_empty() {
        errors.insert("category".to_string(), "Category is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(NewsServiceError::Validation(errors))
    }
}
