//! HTTP handler for the combined feed.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::backend::error::BackendError;
use crate::backend::federation::sync;
use crate::backend::server::state::AppState;

use super::composer::{self, FeedPage, FeedQuery, FeedSource};

/// `GET /api/feed`
///
/// Serves whatever is currently mirrored; never blocks on the network.
/// When the page contains remote rows, a stale-sync pass is queued in the
/// background so a later read sees fresher data.
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedPage>, BackendError> {
    let page = composer::compose_feed(&state.db_pool, &query).await?;

    if page.items.iter().any(|item| item.source == FeedSource::Remote) {
        sync::trigger_stale_syncs(state.clone());
    }

    Ok(Json(page))
}
