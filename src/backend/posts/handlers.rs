//! HTTP handlers for the local authoring surface.
//!
//! Minimal CRUD plus lifecycle transitions. Every transition of a
//! categorized post into or out of the published state notifies that
//! category's federation subscribers; dispatch is fire-and-forget and the
//! mutation result never depends on delivery.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::federation::webhook;
use crate::backend::server::state::AppState;
use crate::shared::federation::{
    EVENT_POST_DELETED, EVENT_POST_PUBLISHED, EVENT_POST_UNPUBLISHED, EVENT_POST_UPDATED,
};
use crate::shared::models::{Category, Post, PostStatus};

use super::db;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub author_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

/// `POST /api/categories`
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<Json<Category>, BackendError> {
    if request.name.trim().is_empty() || request.slug.trim().is_empty() {
        return Err(BackendError::bad_request("name and slug are required"));
    }

    let category = db::create_category(
        &state.db_pool,
        &request.name,
        &request.slug,
        request.description.as_deref(),
        request.is_public,
    )
    .await?;

    Ok(Json(category))
}

/// `POST /api/posts` - create a draft
pub async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<Json<Post>, BackendError> {
    if request.title.trim().is_empty() {
        return Err(BackendError::bad_request("title is required"));
    }
    if let Some(category_id) = request.category_id {
        if db::get_category(&state.db_pool, category_id).await?.is_none() {
            return Err(BackendError::not_found("Category not found"));
        }
    }

    let post = db::create_post(
        &state.db_pool,
        request.category_id,
        &request.title,
        &request.slug,
        &request.content,
        request.excerpt.as_deref(),
        request.cover_image.as_deref(),
        &request.author_name,
    )
    .await?;

    Ok(Json(post))
}

/// `PUT /api/posts/{id}` - edit content; notifies subscribers when the
/// post is currently published
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<Post>, BackendError> {
    let post = db::update_post(
        &state.db_pool,
        post_id,
        request.category_id,
        &request.title,
        &request.content,
        request.excerpt.as_deref(),
        request.cover_image.as_deref(),
    )
    .await?
    .ok_or_else(|| BackendError::not_found("Post not found"))?;

    if post.status == PostStatus::Published {
        webhook::dispatch_post_event(&state, EVENT_POST_UPDATED, &post);
    }

    Ok(Json(post))
}

/// `POST /api/posts/{id}/publish`
pub async fn publish_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Post>, BackendError> {
    let post = db::set_post_status(&state.db_pool, post_id, PostStatus::Published)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;

    webhook::dispatch_post_event(&state, EVENT_POST_PUBLISHED, &post);

    Ok(Json(post))
}

/// `POST /api/posts/{id}/unpublish` - withdraw back to draft
pub async fn unpublish_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Post>, BackendError> {
    let was_published = db::get_post(&state.db_pool, post_id)
        .await?
        .map(|p| p.status == PostStatus::Published)
        .unwrap_or(false);

    let post = db::set_post_status(&state.db_pool, post_id, PostStatus::Draft)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;

    if was_published {
        webhook::dispatch_post_event(&state, EVENT_POST_UNPUBLISHED, &post);
    }

    Ok(Json(post))
}

/// `DELETE /api/posts/{id}` - soft delete
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Post>, BackendError> {
    let was_published = db::get_post(&state.db_pool, post_id)
        .await?
        .map(|p| p.status == PostStatus::Published)
        .unwrap_or(false);

    let post = db::set_post_status(&state.db_pool, post_id, PostStatus::Deleted)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;

    if was_published {
        webhook::dispatch_post_event(&state, EVENT_POST_DELETED, &post);
    }

    Ok(Json(post))
}
