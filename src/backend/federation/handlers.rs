//! Inbound federation HTTP handlers.
//!
//! Provider side: identity, public categories, authorized post reads, and
//! subscriber registration. Consumer side: subscribing this instance to a
//! remote category, voluntary unsubscribe, the webhook receiver, and the
//! admin "sync now" action.

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::federation::{identity, mirror, subscribers, subscriptions, sync, urls, webhook};
use crate::backend::posts::db as posts_db;
use crate::backend::server::config::SiteConfig;
use crate::backend::server::state::AppState;
use crate::shared::federation::{
    BlogInfo, CategoryInfo, FederatedPost, SubscribeRemoteRequest, SubscribeRequest, SyncReport,
    UnsubscribeRequest, WebhookPayload, EVENT_POST_DELETED, EVENT_POST_PUBLISHED,
    EVENT_POST_UNPUBLISHED, EVENT_POST_UPDATED, SUBSCRIBER_URL_HEADER,
};
use crate::shared::models::Category;

/// Timeout for registration calls made while handling a consumer-side
/// subscribe request.
const REGISTER_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub since: Option<DateTime<Utc>>,
}

/// Check the optional self-declared subscriber identity against the
/// registry.
///
/// No header means an anonymous public read. A header matching an
/// inactive subscriber row gets the distinguished revocation code, never a
/// generic 403, so the consumer's pull-sync worker can recognize it. An
/// unknown URL is allowed through as public (the header is advisory)
/// unless the category is private.
async fn authorize_subscriber(
    pool: &SqlitePool,
    category: &Category,
    headers: &HeaderMap,
) -> Result<(), BackendError> {
    let declared = headers
        .get(SUBSCRIBER_URL_HEADER)
        .and_then(|h| h.to_str().ok());

    if let Some(url) = declared {
        match subscribers::find_subscriber(pool, category.id, url).await? {
            Some(subscriber) if subscriber.is_active => return Ok(()),
            Some(_) => {
                return Err(BackendError::revoked(format!(
                    "subscriber {url} for category {}",
                    category.id
                )))
            }
            None => {}
        }
    }

    if category.is_public {
        Ok(())
    } else {
        Err(BackendError::handler(
            StatusCode::FORBIDDEN,
            "Category is not public",
        ))
    }
}

/// `GET /api/federation/info` - this instance's identity
pub async fn get_info(State(site): State<SiteConfig>) -> Json<BlogInfo> {
    Json(BlogInfo {
        site_url: site.site_url.clone(),
        display_name: site.display_name.clone(),
        blog_title: site.blog_title.clone(),
        blog_description: site.blog_description.clone(),
        avatar_url: site.avatar_url.clone(),
        blog_handle: site.blog_handle.clone(),
    })
}

/// `GET /api/federation/categories` - public categories
pub async fn list_categories(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<CategoryInfo>>, BackendError> {
    let categories = posts_db::list_public_categories(&pool).await?;
    Ok(Json(
        categories
            .into_iter()
            .map(|c| CategoryInfo {
                id: c.id.to_string(),
                name: c.name,
                slug: c.slug,
                description: c.description,
            })
            .collect(),
    ))
}

/// `GET /api/federation/categories/{id}/posts` - published posts of a
/// category, optionally filtered `since` a timestamp. Asset paths are
/// rewritten absolute because the consumer has no other base to resolve
/// against.
pub async fn list_category_posts(
    State(pool): State<SqlitePool>,
    State(site): State<SiteConfig>,
    Path(category_id): Path<Uuid>,
    Query(query): Query<PostsQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<FederatedPost>>, BackendError> {
    let category = posts_db::get_category(&pool, category_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Category not found"))?;

    authorize_subscriber(&pool, &category, &headers).await?;

    let posts = posts_db::list_published_posts(&pool, category.id, query.since).await?;
    Ok(Json(
        posts
            .iter()
            .map(|p| urls::project_post(p, &site.site_url))
            .collect(),
    ))
}

/// `GET /api/federation/posts/{id}` - a single published post
pub async fn get_federated_post(
    State(pool): State<SqlitePool>,
    State(site): State<SiteConfig>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<FederatedPost>, BackendError> {
    let post = posts_db::get_published_post(&pool, post_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;

    if let Some(category_id) = post.category_id {
        if let Some(category) = posts_db::get_category(&pool, category_id).await? {
            authorize_subscriber(&pool, &category, &headers).await?;
        }
    }

    Ok(Json(urls::project_post(&post, &site.site_url)))
}

/// `POST /api/federation/subscribe` - a remote blog registers as a
/// subscriber of one of our categories
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<serde_json::Value>, BackendError> {
    if request.subscriber_url.trim().is_empty() || request.callback_url.trim().is_empty() {
        return Err(BackendError::bad_request(
            "subscriberUrl and callbackUrl are required",
        ));
    }

    let category_id = Uuid::parse_str(&request.category_id)
        .map_err(|_| BackendError::not_found("Category not found"))?;
    let category = posts_db::get_category(&state.db_pool, category_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Category not found"))?;

    let (subscriber, newly_active) = subscribers::upsert_subscriber(
        &state.db_pool,
        category.id,
        &request.subscriber_url,
        &request.callback_url,
    )
    .await?;

    if newly_active {
        tracing::info!(
            "[Federation] New subscriber {} for category '{}'",
            subscriber.subscriber_url,
            category.name
        );
        webhook::notify_subscription_alert(&state, &category.name, &subscriber.subscriber_url);
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "subscriberId": subscriber.id,
    })))
}

/// `POST /api/federation/unsubscribe` - a remote blog withdraws itself
pub async fn unsubscribe(
    State(pool): State<SqlitePool>,
    Json(request): Json<UnsubscribeRequest>,
) -> Result<Json<serde_json::Value>, BackendError> {
    let category_id = Uuid::parse_str(&request.category_id)
        .map_err(|_| BackendError::not_found("Category not found"))?;

    let removed =
        subscribers::deactivate_subscriber(&pool, category_id, &request.subscriber_url).await?;

    Ok(Json(serde_json::json!({ "success": removed })))
}

/// `POST /api/federation/webhook` - push notification from a blog this
/// instance subscribes to. Applies the same upsert-by-`remote_uri` rule
/// as pull sync; the pull path remains the durable fallback.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<serde_json::Value>, BackendError> {
    if payload.site_url.trim().is_empty() {
        return Err(BackendError::bad_request("siteUrl is required"));
    }
    if payload.category_id.trim().is_empty() {
        return Err(BackendError::bad_request("categoryId is required"));
    }

    // Reject unknown events before anything is written; a malformed
    // notification must not register its origin as a side effect.
    let is_upsert = match payload.event.as_str() {
        EVENT_POST_PUBLISHED | EVENT_POST_UPDATED => true,
        EVENT_POST_UNPUBLISHED | EVENT_POST_DELETED => false,
        other => {
            return Err(BackendError::bad_request(format!("Unknown event '{other}'")));
        }
    };

    // First contact from an unseen origin lazily registers it.
    let blog = identity::get_or_create_remote_blog(
        &state.db_pool,
        &payload.site_url,
        None,
        None,
        None,
    )
    .await?;

    let remote_category = identity::get_or_create_remote_category(
        &state.db_pool,
        blog.id,
        &payload.category_id,
        &payload.category_id,
        &payload.category_id,
    )
    .await?;

    let post = &payload.post;
    let remote_uri =
        urls::canonicalize_remote_uri(post.uri.as_deref(), &blog.site_url, &post.id);

    if is_upsert {
        let local_category_id =
            subscriptions::find_active_by_remote_category(&state.db_pool, remote_category.id)
                .await?
                .map(|s| s.local_category_id);

        let upsert = mirror::RemotePostUpsert {
            remote_uri,
            remote_blog_id: blog.id,
            remote_category_id: remote_category.id,
            local_category_id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: urls::rewrite_relative_urls(&post.content, &blog.site_url),
            excerpt: post.excerpt.clone(),
            cover_image: post
                .cover_image
                .as_deref()
                .map(|c| urls::absolutize(c, &blog.site_url)),
            author_name: post.author_name.clone(),
            remote_created_at: post.created_at,
            remote_updated_at: post.updated_at,
        };
        mirror::upsert_remote_post(&state.db_pool, &upsert).await?;
    } else {
        mirror::mark_remote_post_deleted(&state.db_pool, &remote_uri).await?;
    }

    tracing::debug!(
        "[Federation] Webhook {} applied for {}",
        payload.event,
        payload.site_url
    );

    Ok(Json(serde_json::json!({ "received": true })))
}

/// `POST /api/federation/subscriptions` - subscribe this instance to a
/// remote category, mirroring it into a local category.
///
/// Remote identity and categories are fetched first and registration is
/// completed against the provider before any local row is written, so a
/// failed exchange mutates nothing.
pub async fn subscribe_remote(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRemoteRequest>,
) -> Result<Json<crate::shared::models::CategorySubscription>, BackendError> {
    let local_category = posts_db::get_category(&state.db_pool, request.local_category_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Local category not found"))?;

    let remote_base = urls::normalize_site_url(&request.remote_site_url);
    if remote_base.is_empty() {
        return Err(BackendError::bad_request("remoteSiteUrl is required"));
    }

    let info: BlogInfo = state
        .http
        .get(format!("{remote_base}/api/federation/info"))
        .timeout(REGISTER_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let remote_categories: Vec<CategoryInfo> = state
        .http
        .get(format!("{remote_base}/api/federation/categories"))
        .timeout(REGISTER_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let remote_category_info = remote_categories
        .into_iter()
        .find(|c| c.id == request.remote_category_id)
        .ok_or_else(|| BackendError::not_found("Remote category not found"))?;

    let register = SubscribeRequest {
        category_id: remote_category_info.id.clone(),
        subscriber_url: state.site.site_url.clone(),
        callback_url: format!("{}/api/federation/webhook", state.site.site_url),
    };
    let response = state
        .http
        .post(format!("{remote_base}/api/federation/subscribe"))
        .timeout(REGISTER_TIMEOUT)
        .json(&register)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(BackendError::RemoteRejected {
            status: response.status().as_u16(),
        });
    }

    let blog = identity::get_or_create_remote_blog(
        &state.db_pool,
        &remote_base,
        Some(&info.display_name),
        Some(&info.blog_title),
        info.avatar_url.as_deref(),
    )
    .await?;
    let remote_category = identity::get_or_create_remote_category(
        &state.db_pool,
        blog.id,
        &remote_category_info.id,
        &remote_category_info.name,
        &remote_category_info.slug,
    )
    .await?;

    let subscription =
        subscriptions::upsert_subscription(&state.db_pool, local_category.id, remote_category.id)
            .await?;

    tracing::info!(
        "[Federation] Subscribed category '{}' to {}/{}",
        local_category.name,
        blog.site_url,
        remote_category.name
    );

    // Initial pull, off the response path
    let sync_state = state.clone();
    let subscription_id = subscription.id;
    tokio::spawn(async move {
        if let Err(e) = sync::sync_subscription(&sync_state, subscription_id).await {
            tracing::warn!("[Sync] Initial sync for {} failed: {}", subscription_id, e);
        }
    });

    Ok(Json(subscription))
}

/// `DELETE /api/federation/subscriptions/{id}` - stop mirroring a remote
/// category. Severs the subscription the same way a revocation would
/// (mirror marked unreachable) and tells the provider, best-effort.
pub async fn unsubscribe_remote(
    State(state): State<AppState>,
    Path(subscription_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, BackendError> {
    let subscription = subscriptions::get_subscription(&state.db_pool, subscription_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Subscription not found"))?;

    sync::handle_revocation(&state.db_pool, &subscription).await?;

    if let Some(remote_category) =
        identity::get_remote_category(&state.db_pool, subscription.remote_category_id).await?
    {
        if let Some(blog) =
            identity::get_remote_blog(&state.db_pool, remote_category.remote_blog_id).await?
        {
            let request = UnsubscribeRequest {
                category_id: remote_category.remote_id.clone(),
                subscriber_url: state.site.site_url.clone(),
            };
            let http = state.http.clone();
            tokio::spawn(async move {
                let result = http
                    .post(format!("{}/api/federation/unsubscribe", blog.site_url))
                    .timeout(REGISTER_TIMEOUT)
                    .json(&request)
                    .send()
                    .await;
                if let Err(e) = result {
                    tracing::warn!("[Federation] Unsubscribe notify failed: {}", e);
                }
            });
        }
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

/// `POST /api/federation/sync` - admin "sync now", returns batch counts
pub async fn sync_now(State(state): State<AppState>) -> Result<Json<SyncReport>, BackendError> {
    let report = sync::sync_all_subscriptions(&state).await?;
    Ok(Json(report))
}
