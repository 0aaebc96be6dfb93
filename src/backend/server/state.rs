//! Application State Management
//!
//! This module defines the application state structure and implements the
//! necessary `FromRef` traits for Axum state extraction.
//!
//! # Architecture
//!
//! The `AppState` struct serves as the central state container for the
//! application, holding:
//! - The SQLite connection pool (the only shared mutable resource)
//! - The site configuration
//! - A shared reqwest client for all outbound federation calls
//! - The stale-sync trigger guard (process-local dedup set)
//!
//! # State Extraction
//!
//! The `FromRef` implementations allow Axum handlers to extract specific
//! parts of the state without needing the entire `AppState`. This follows
//! Axum's recommended pattern for state management.

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::federation::sync::SyncTriggerGuard;
use crate::backend::server::config::SiteConfig;

/// Application state shared across all request handlers
///
/// # Fields
///
/// * `db_pool` - SQLite connection pool
/// * `site` - Site identity and federation settings
/// * `http` - Shared HTTP client for webhook delivery and pull sync
/// * `sync_guard` - Cooldown set preventing duplicate stale-sync triggers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    ///
    /// All mutations are single self-contained writes (or short
    /// transactions where multiple rows change together), relying on
    /// SQLite's single-writer serialization; no application-level locking.
    pub db_pool: SqlitePool,

    /// Site identity, read once at startup.
    pub site: SiteConfig,

    /// Shared outbound HTTP client. Per-request timeouts are set at the
    /// call sites (webhook dispatch, pull sync).
    pub http: reqwest::Client,

    /// Process-local, time-evicting set of subscription ids recently
    /// queued for a stale-sync pass.
    pub sync_guard: SyncTriggerGuard,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, site: SiteConfig) -> Self {
        Self {
            db_pool,
            site,
            http: reqwest::Client::new(),
            sync_guard: SyncTriggerGuard::new(),
        }
    }
}

/// Allow handlers to extract the pool directly via `State(SqlitePool)`.
impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

/// Allow handlers to extract the site configuration directly.
impl FromRef<AppState> for SiteConfig {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.site.clone()
    }
}

/// Allow handlers to extract the shared HTTP client directly.
impl FromRef<AppState> for reqwest::Client {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.http.clone()
    }
}

/// Allow handlers to extract the stale-sync guard directly.
impl FromRef<AppState> for SyncTriggerGuard {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sync_guard.clone()
    }
}
