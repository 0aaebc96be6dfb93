//! Server Initialization
//!
//! This module handles the initialization and setup of the Axum HTTP
//! server, including state creation, database loading, route configuration,
//! and the periodic pull-sync timer.
//!
//! # Initialization Process
//!
//! 1. Load site configuration from the environment
//! 2. Connect the database pool and run migrations
//! 3. Create `AppState` and the router
//! 4. Spawn the periodic pull-sync task (first pass delayed ~5s so
//!    initialization can complete before any network traffic)

use axum::Router;

use crate::backend::federation::sync;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, SiteConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// Sets up the HTTP server with database, state, routes, and the
/// background sync timer. Returns an error only if the database cannot be
/// opened or migrated; federation network failures never prevent startup.
pub async fn create_app() -> Result<Router<()>, sqlx::Error> {
    let site = SiteConfig::from_env();
    tracing::info!("Initializing zlog server for {}", site.site_url);

    let db_pool = load_database().await?;

    let app_state = AppState::new(db_pool, site);

    let app = create_router(app_state.clone());

    // Periodic pull-sync pass. Webhooks are best-effort; this timer is the
    // durability backstop for subscriptions that missed a notification.
    sync::spawn_sync_timer(app_state);

    tracing::info!("Router configured with periodic sync task");

    Ok(app)
}
