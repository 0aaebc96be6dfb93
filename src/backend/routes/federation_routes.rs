/**
 * Federation Route Handlers
 *
 * This module defines the federation surface. The provider half serves
 * this instance's content to peers; the consumer half manages this
 * instance's subscriptions to peers and receives their webhooks.
 *
 * # Routes
 *
 * ## Provider side
 * - `GET /api/federation/info` - Blog identity
 * - `GET /api/federation/categories` - Public categories
 * - `GET /api/federation/categories/{id}/posts` - Published posts, with
 *   optional `?since=` filter
 * - `GET /api/federation/posts/{id}` - Single published post
 * - `POST /api/federation/subscribe` - Register a subscriber
 * - `POST /api/federation/unsubscribe` - Deregister a subscriber
 *
 * ## Consumer side
 * - `POST /api/federation/webhook` - Inbound change notifications
 * - `POST /api/federation/subscriptions` - Subscribe to a remote category
 * - `DELETE /api/federation/subscriptions/{id}` - Cancel a subscription
 * - `POST /api/federation/sync` - Sync all subscriptions now
 */

use axum::Router;

use crate::backend::federation::handlers::{
    get_federated_post, get_info, list_categories, list_category_posts, receive_webhook,
    subscribe, subscribe_remote, sync_now, unsubscribe, unsubscribe_remote,
};
use crate::backend::server::state::AppState;

/// Configure federation routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
///
/// # Returns
///
/// Router with federation routes configured
pub fn configure_federation_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Provider endpoints
        .route("/api/federation/info", axum::routing::get(get_info))
        .route(
            "/api/federation/categories",
            axum::routing::get(list_categories),
        )
        .route(
            "/api/federation/categories/{id}/posts",
            axum::routing::get(list_category_posts),
        )
        .route(
            "/api/federation/posts/{id}",
            axum::routing::get(get_federated_post),
        )
        .route(
            "/api/federation/subscribe",
            axum::routing::post(subscribe),
        )
        .route(
            "/api/federation/unsubscribe",
            axum::routing::post(unsubscribe),
        )
        // Consumer endpoints
        .route(
            "/api/federation/webhook",
            axum::routing::post(receive_webhook),
        )
        .route(
            "/api/federation/subscriptions",
            axum::routing::post(subscribe_remote),
        )
        .route(
            "/api/federation/subscriptions/{id}",
            axum::routing::delete(unsubscribe_remote),
        )
        .route("/api/federation/sync", axum::routing::post(sync_now))
}
