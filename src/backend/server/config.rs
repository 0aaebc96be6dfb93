//! Server Configuration
//!
//! This module handles loading of the site identity, federation sync
//! settings, and the SQLite connection pool.
//!
//! # Configuration Sources
//!
//! Configuration is loaded from environment variables, with sensible
//! defaults for local development. Only `ZLOG_SITE_URL` matters for
//! federation correctness: it is the canonical origin other instances know
//! this blog by, and the base every relative asset path is rewritten
//! against.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::backend::federation::urls::normalize_site_url;

/// Floor for the periodic sync interval; more aggressive values would
/// hammer remote instances for no benefit.
const MIN_SYNC_INTERVAL_MINUTES: u64 = 1;
const DEFAULT_SYNC_INTERVAL_MINUTES: u64 = 5;

/// Site identity and federation settings, loaded once at startup and
/// shared through `AppState`.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Canonical origin of this instance, without a trailing slash.
    pub site_url: String,
    pub display_name: String,
    pub blog_title: String,
    pub blog_description: String,
    pub avatar_url: Option<String>,
    pub blog_handle: String,
    /// Minutes between periodic pull-sync passes (minimum 1).
    pub sync_interval_minutes: u64,
    /// Optional external notification channel for human-readable alerts
    /// (e.g. a chat webhook). Fire-and-forget when set.
    pub notify_webhook_url: Option<String>,
}

impl SiteConfig {
    /// Load site configuration from environment variables.
    pub fn from_env() -> Self {
        let site_url = std::env::var("ZLOG_SITE_URL")
            .unwrap_or_else(|_| "http://localhost:4000".to_string());

        let sync_interval_minutes = clamp_sync_interval(
            std::env::var("WEBHOOK_SYNC_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<u64>().ok()),
        );

        Self {
            site_url: normalize_site_url(&site_url),
            display_name: std::env::var("ZLOG_DISPLAY_NAME")
                .unwrap_or_else(|_| "Zlog".to_string()),
            blog_title: std::env::var("ZLOG_BLOG_TITLE")
                .unwrap_or_else(|_| "A Zlog blog".to_string()),
            blog_description: std::env::var("ZLOG_BLOG_DESCRIPTION").unwrap_or_default(),
            avatar_url: std::env::var("ZLOG_AVATAR_URL").ok(),
            blog_handle: std::env::var("ZLOG_BLOG_HANDLE")
                .unwrap_or_else(|_| "zlog".to_string()),
            sync_interval_minutes,
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").ok(),
        }
    }
}

fn clamp_sync_interval(configured: Option<u64>) -> u64 {
    configured
        .unwrap_or(DEFAULT_SYNC_INTERVAL_MINUTES)
        .max(MIN_SYNC_INTERVAL_MINUTES)
}

/// Load and initialize the database connection pool
///
/// This function:
/// 1. Reads `DATABASE_URL` from the environment (defaults to a local
///    SQLite file, created if missing)
/// 2. Creates the connection pool
/// 3. Runs database migrations
pub async fn load_database() -> Result<SqlitePool, sqlx::Error> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:zlog.db?mode=rwc".to_string());

    tracing::info!("Connecting to database...");

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {:?}", e);
        sqlx::Error::Migrate(Box::new(e))
    })?;

    tracing::info!("Database ready");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_interval_floor() {
        assert_eq!(clamp_sync_interval(None), DEFAULT_SYNC_INTERVAL_MINUTES);
        assert_eq!(clamp_sync_interval(Some(0)), 1);
        assert_eq!(clamp_sync_interval(Some(30)), 30);
    }
}
