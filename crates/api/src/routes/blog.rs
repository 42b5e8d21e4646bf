//! Blog route handlers.
//!
//! Public list/read of published posts; admin CRUD including drafts.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::blog::{BlogRepository, UpsertBlogPost};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Pagination for the public listing.
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Post create/update body.
#[derive(Debug, Deserialize)]
pub struct UpsertPostRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub body: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

/// GET /api/blog
#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Value>> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let posts = BlogRepository::new(state.pool())
        .list_published(limit, offset)
        .await?;

    Ok(Json(json!({ "success": true, "data": { "posts": posts } })))
}

/// GET /api/blog/{slug}
#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let post = BlogRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .filter(|p| p.published)
        .ok_or_else(|| AppError::NotFound(format!("no post at {slug}")))?;

    Ok(Json(json!({ "success": true, "data": { "post": post } })))
}

// =============================================================================
// Admin
// =============================================================================

/// GET /api/admin/blog
#[instrument(skip(state, _admin))]
pub async fn admin_list_posts(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Value>> {
    let posts = BlogRepository::new(state.pool()).list_all().await?;

    Ok(Json(json!({ "success": true, "data": { "posts": posts } })))
}

/// POST /api/admin/blog
#[instrument(skip(state, _admin, body), fields(slug = %body.slug))]
pub async fn create_post(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(body): Json<UpsertPostRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let post = BlogRepository::new(state.pool())
        .create(UpsertBlogPost {
            slug: &body.slug,
            title: &body.title,
            excerpt: &body.excerpt,
            body: &body.body,
            author: &body.author,
            tags: &body.tags,
            published: body.published,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Post created",
            "data": { "post": post },
        })),
    ))
}

/// PUT /api/admin/blog/{slug}
#[instrument(skip(state, _admin, body), fields(slug = %slug))]
pub async fn update_post(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(slug): Path<String>,
    Json(body): Json<UpsertPostRequest>,
) -> Result<Json<Value>> {
    let post = BlogRepository::new(state.pool())
        .update(
            &slug,
            UpsertBlogPost {
                slug: &body.slug,
                title: &body.title,
                excerpt: &body.excerpt,
                body: &body.body,
                author: &body.author,
                tags: &body.tags,
                published: body.published,
            },
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Post updated",
        "data": { "post": post },
    })))
}

/// DELETE /api/admin/blog/{slug}
#[instrument(skip(state, _admin), fields(slug = %slug))]
pub async fn delete_post(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let deleted = BlogRepository::new(state.pool()).delete(&slug).await?;

    if !deleted {
        return Err(AppError::NotFound(format!("no post at {slug}")));
    }

    Ok(Json(json!({ "success": true, "message": "Post deleted" })))
}
