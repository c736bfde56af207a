//! News API endpoints
//!
//! Public listing and lookup, authenticated create/update/delete with
//! ownership enforcement. Mutations accept multipart form data with an
//! `image` file field alongside the text fields.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::ListParams;
use crate::services::NewsInput;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

/// Query parameters for the listing endpoint
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Multipart article form: text fields plus an optional image file
struct ArticleForm {
    title: String,
    content: String,
    category: String,
    image: Option<(Vec<u8>, String)>,
}

impl ArticleForm {
    fn input(&self) -> NewsInput {
        NewsInput {
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
        }
    }
}

/// Read the article form out of a multipart body.
///
/// Unknown fields are ignored. An `image` field without bytes counts
/// as absent so that updates can omit the file.
async fn read_article_form(mut multipart: Multipart) -> Result<ArticleForm, ApiError> {
    let mut form = ArticleForm {
        title: String::new(),
        content: String::new(),
        category: String::new(),
        image: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read multipart field");
        ApiError::bad_request("Malformed multipart body")
    })? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => {
                form.title = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Malformed multipart body"))?;
            }
            "content" => {
                form.content = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Malformed multipart body"))?;
            }
            "category" => {
                form.category = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Malformed multipart body"))?;
            }
            "image" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Malformed multipart body"))?;
                if !data.is_empty() {
                    form.image = Some((data.to_vec(), content_type));
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// GET /api/news - Paginated listing with a read-through cache
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = ListParams::new(
        query.page.unwrap_or(DEFAULT_PAGE),
        query.limit.unwrap_or(DEFAULT_LIMIT),
    );

    let result = state.news_service.list(params).await?;

    Ok(Json(json!({
        "status": 200,
        "news": result.items,
        "metadata": {
            "totalPages": result.total_pages(),
            "currentPage": result.page,
            "currentLimit": result.per_page,
        },
    })))
}

/// GET /api/news/{id} - Single article with its author projection
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state.news_service.get(id).await?;

    Ok(Json(json!({
        "status": 200,
        "news": article,
    })))
}

/// POST /api/news - Create an article owned by the requester
pub async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_article_form(multipart).await?;
    let (image_data, image_type) = form
        .image
        .as_ref()
        .map(|(data, ct)| (data.as_slice(), ct.as_str()))
        .ok_or_else(|| {
            ApiError::from(crate::services::ImageError::Missing)
        })?;

    let article = state
        .news_service
        .create(&user.0, form.input(), image_data, image_type)
        .await?;

    Ok(Json(json!({
        "message": "News created",
        "data": article,
    })))
}

/// PUT /api/news/{id} - Update an owned article, optionally replacing the image
pub async fn update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_article_form(multipart).await?;
    let image = form
        .image
        .as_ref()
        .map(|(data, ct)| (data.as_slice(), ct.as_str()));

    state
        .news_service
        .update(&user.0, id, form.input(), image)
        .await?;

    Ok(Json(json!({ "message": "News updated" })))
}

/// DELETE /api/news/{id} - Delete an owned article and its stored image
pub async fn delete(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.news_service.delete(&user.0, id).await?;

    Ok(Json(json!({ "message": "News deleted" })))
}
