/**
 * API Route Handlers
 *
 * This module defines route handlers for the local authoring surface and
 * the combined feed:
 * - Category and post CRUD plus lifecycle transitions
 * - The merged local + remote feed
 *
 * # Routes
 *
 * ## Authoring
 * - `POST /api/categories` - Create a category
 * - `POST /api/posts` - Create a draft post
 * - `PUT /api/posts/{id}` - Edit a post
 * - `POST /api/posts/{id}/publish` - Publish a post
 * - `POST /api/posts/{id}/unpublish` - Withdraw a post to draft
 * - `DELETE /api/posts/{id}` - Soft-delete a post
 *
 * ## Feed
 * - `GET /api/feed` - Paginated feed over local and mirrored posts
 */

use axum::Router;

use crate::backend::feed::handlers::get_feed;
use crate::backend::posts::handlers::{
    create_category, create_post, delete_post, publish_post, unpublish_post, update_post,
};
use crate::backend::server::state::AppState;

/// Configure authoring and feed routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
///
/// # Returns
///
/// Router with API routes configured
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Authoring endpoints
        .route("/api/categories", axum::routing::post(create_category))
        .route("/api/posts", axum::routing::post(create_post))
        .route(
            "/api/posts/{id}",
            axum::routing::put(update_post).delete(delete_post),
        )
        .route(
            "/api/posts/{id}/publish",
            axum::routing::post(publish_post),
        )
        .route(
            "/api/posts/{id}/unpublish",
            axum::routing::post(unpublish_post),
        )
        // Feed endpoint
        .route("/api/feed", axum::routing::get(get_feed))
}
