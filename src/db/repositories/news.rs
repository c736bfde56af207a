//! News repository
//!
//! Database operations for news articles. All reads join the owner's row
//! so callers get the author projection without a second query.

use crate::models::{AuthorInfo, CreateNewsInput, NewsArticle, UpdateNewsInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Create a new article
    async fn create(&self, input: &CreateNewsInput) -> Result<NewsArticle>;

    /// Get article by ID, with its author
    async fn get_by_id(&self, id: i64) -> Result<Option<NewsArticle>>;

    /// List articles newest first, with their authors
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<NewsArticle>>;

    /// Count total articles
    async fn count(&self) -> Result<i64>;

    /// Update an article
    async fn update(&self, id: i64, input: &UpdateNewsInput) -> Result<NewsArticle>;

    /// Delete an article
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based news repository implementation
pub struct SqlxNewsRepository {
    pool: SqlitePool,
}

impl SqlxNewsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_WITH_AUTHOR: &str = r#"
    SELECT n.id, n.title, n.content, n.category, n.image, n.user_id,
           n.created_at, n.updated_at,
           u.name AS author_name, u.profile AS author_profile
    FROM news n
    JOIN users u ON u.id = n.user_id
"#;

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput) -> Result<NewsArticle> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO news (title, content, category, image, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.category)
        .bind(&input.image)
        .bind(input.user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create news article")?;

        let id = result.last_insert_rowid();

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Article not found after insert"))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<NewsArticle>> {
        let query = format!("{} WHERE n.id = ?", SELECT_WITH_AUTHOR);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get news article by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_article(&row))),
            None => Ok(None),
        }
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<NewsArticle>> {
        let query = format!(
            "{} ORDER BY n.created_at DESC, n.id DESC LIMIT ? OFFSET ?",
            SELECT_WITH_AUTHOR
        );
        let rows = sqlx::query(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list news articles")?;

        Ok(rows.iter().map(row_to_article).collect())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM news")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count news articles")?;

        Ok(row.get("count"))
    }

    async fn update(&self, id: i64, input: &UpdateNewsInput) -> Result<NewsArticle> {
        let now = Utc::now();

        if let Some(image) = &input.image {
            sqlx::query(
                r#"
                UPDATE news
                SET title = ?, content = ?, category = ?, image = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.category)
            .bind(image)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update news article")?;
        } else {
            sqlx::query(
                r#"
                UPDATE news
                SET title = ?, content = ?, category = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.category)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update news article")?;
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Article not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM news WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete news article")?;

        Ok(())
    }
}

fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> NewsArticle {
    let user_id: i64 = row.get("user_id");
    NewsArticle {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        category: row.get("category"),
        image: row.get("image"),
        user_id,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        author: AuthorInfo {
            id: user_id,
            name: row.get("author_name"),
            profile: row.get("author_profile"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::user::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::User;

    async fn setup() -> (SqlxNewsRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let user = users
            .create(&User::new(
                "Author".to_string(),
                "author@example.com".to_string(),
                "hash".to_string(),
                Some("https://example.com/a.png".to_string()),
            ))
            .await
            .expect("Failed to create user");

        (SqlxNewsRepository::new(pool), user.id)
    }

    fn create_input(title: &str, user_id: i64) -> CreateNewsInput {
        CreateNewsInput {
            title: title.to_string(),
            content: "Body text".to_string(),
            category: "tech".to_string(),
            image: "img.png".to_string(),
            user_id,
        }
    }

    #[tokio::test]
    async fn test_create_article() {
        let (repo, user_id) = setup().await;

        let article = repo
            .create(&create_input("First", user_id))
            .await
            .expect("Failed to create article");

        assert!(article.id > 0);
        assert_eq!(article.title, "First");
        assert_eq!(article.user_id, user_id);
        assert_eq!(article.author.name, "Author");
        assert_eq!(
            article.author.profile.as_deref(),
            Some("https://example.com/a.png")
        );
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (repo, _user_id) = setup().await;

        let found = repo.get_by_id(999).await.expect("Failed to query");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (repo, user_id) = setup().await;

        for i in 0..3 {
            repo.create(&create_input(&format!("Article {}", i), user_id))
                .await
                .expect("Failed to create article");
        }

        let articles = repo.list(0, 10).await.expect("Failed to list");
        assert_eq!(articles.len(), 3);
        // Newest first: last created comes out first
        assert_eq!(articles[0].title, "Article 2");
        assert_eq!(articles[2].title, "Article 0");
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let (repo, user_id) = setup().await;

        for i in 0..5 {
            repo.create(&create_input(&format!("Article {}", i), user_id))
                .await
                .expect("Failed to create article");
        }

        let page1 = repo.list(0, 2).await.expect("Failed to list");
        let page2 = repo.list(2, 2).await.expect("Failed to list");
        let page3 = repo.list(4, 2).await.expect("Failed to list");

        assert_eq!(page1.len(), 2);
        assert_eq!(page2.len(), 2);
        assert_eq!(page3.len(), 1);

        // Pages must not overlap
        assert_ne!(page1[0].id, page2[0].id);
        assert_ne!(page2[0].id, page3[0].id);
    }

    #[tokio::test]
    async fn test_list_beyond_end_is_empty() {
        let (repo, user_id) = setup().await;
        repo.create(&create_input("Only", user_id))
            .await
            .expect("Failed to create article");

        let articles = repo.list(100, 10).await.expect("Failed to list");
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_count() {
        let (repo, user_id) = setup().await;

        assert_eq!(repo.count().await.expect("Failed to count"), 0);

        repo.create(&create_input("One", user_id))
            .await
            .expect("Failed to create article");
        repo.create(&create_input("Two", user_id))
            .await
            .expect("Failed to create article");

        assert_eq!(repo.count().await.expect("Failed to count"), 2);
    }

    #[tokio::test]
    async fn test_update_without_image() {
        let (repo, user_id) = setup().await;
        let article = repo
            .create(&create_input("Before", user_id))
            .await
            .expect("Failed to create article");

        let updated = repo
            .update(
                article.id,
                &UpdateNewsInput {
                    title: "After".to_string(),
                    content: "New body".to_string(),
                    category: "world".to_string(),
                    image: None,
                },
            )
            .await
            .expect("Failed to update");

        assert_eq!(updated.title, "After");
        assert_eq!(updated.category, "world");
        // Image untouched when no replacement was uploaded
        assert_eq!(updated.image, "img.png");
        assert_eq!(updated.user_id, user_id);
    }

    #[tokio::test]
    async fn test_update_with_image() {
        let (repo, user_id) = setup().await;
        let article = repo
            .create(&create_input("Pic", user_id))
            .await
            .expect("Failed to create article");

        let updated = repo
            .update(
                article.id,
                &UpdateNewsInput {
                    title: "Pic".to_string(),
                    content: "Body text".to_string(),
                    category: "tech".to_string(),
                    image: Some("new.png".to_string()),
                },
            )
            .await
            .expect("Failed to update");

        assert_eq!(updated.image, "new.png");
    }

    #[tokio::test]
    async fn test_delete() {
        let (repo, user_id) = setup().await;
        let article = repo
            .create(&create_input("Doomed", user_id))
            .await
            .expect("Failed to create article");

        repo.delete(article.id).await.expect("Failed to delete");

        let found = repo.get_by_id(article.id).await.expect("Failed to query");
        assert!(found.is_none());
    }
}
