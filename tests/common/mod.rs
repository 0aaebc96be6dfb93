//! Shared test fixtures.
//!
//! Provides an in-memory SQLite pool with migrations applied, an
//! `AppState`/`TestServer` builder with a fixed test site identity, and
//! seeding helpers for categories, posts, and remote mirror rows.

#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use zlog::backend::federation::{identity, mirror, subscriptions};
use zlog::backend::posts::db as posts_db;
use zlog::backend::routes::create_router;
use zlog::backend::server::config::SiteConfig;
use zlog::backend::server::state::AppState;
use zlog::shared::models::{Category, CategorySubscription, RemoteBlog, RemoteCategory};

pub const TEST_SITE_URL: &str = "http://this.example";

/// Create an in-memory test pool with the schema applied.
///
/// `max_connections(1)` is load-bearing: each `:memory:` connection is its
/// own database, so every query must share the single migrated connection.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Site identity used by every test server.
pub fn test_site_config() -> SiteConfig {
    SiteConfig {
        site_url: TEST_SITE_URL.to_string(),
        display_name: "Test Author".to_string(),
        blog_title: "Test Blog".to_string(),
        blog_description: "A blog under test".to_string(),
        avatar_url: None,
        blog_handle: "test".to_string(),
        sync_interval_minutes: 5,
        notify_webhook_url: None,
    }
}

pub async fn test_state() -> AppState {
    AppState::new(test_pool().await, test_site_config())
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(create_router(state)).expect("Failed to start test server")
}

pub async fn seed_category(pool: &SqlitePool, name: &str, is_public: bool) -> Category {
    posts_db::create_category(pool, name, &name.to_lowercase(), None, is_public)
        .await
        .expect("Failed to seed category")
}

/// Insert a published post directly, with an explicit creation time so
/// ordering tests are deterministic. `age_secs` is subtracted from now.
pub async fn seed_published_post(
    pool: &SqlitePool,
    category_id: Uuid,
    title: &str,
    age_secs: i64,
) -> Uuid {
    let id = Uuid::new_v4();
    let at = Utc::now() - Duration::seconds(age_secs);

    sqlx::query(
        r#"
        INSERT INTO posts (id, category_id, title, slug, content, excerpt, cover_image, author_name, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, '', NULL, NULL, 'tester', 'published', ?, ?)
        "#,
    )
    .bind(id)
    .bind(category_id)
    .bind(title)
    .bind(title.to_lowercase().replace(' ', "-"))
    .bind(at)
    .bind(at)
    .execute(pool)
    .await
    .expect("Failed to seed post");

    id
}

/// Register a remote blog and one of its categories.
pub async fn seed_remote_identity(
    pool: &SqlitePool,
    site_url: &str,
    remote_category_id: &str,
) -> (RemoteBlog, RemoteCategory) {
    let blog = identity::get_or_create_remote_blog(pool, site_url, Some("Peer"), None, None)
        .await
        .expect("Failed to seed remote blog");
    let category =
        identity::get_or_create_remote_category(pool, blog.id, remote_category_id, "News", "news")
            .await
            .expect("Failed to seed remote category");
    (blog, category)
}

pub async fn seed_subscription(
    pool: &SqlitePool,
    local_category_id: Uuid,
    remote_category_id: Uuid,
) -> CategorySubscription {
    subscriptions::upsert_subscription(pool, local_category_id, remote_category_id)
        .await
        .expect("Failed to seed subscription")
}

/// Mirror a remote post with an explicit creation time.
pub async fn seed_remote_post(
    pool: &SqlitePool,
    blog: &RemoteBlog,
    remote_category: &RemoteCategory,
    local_category_id: Option<Uuid>,
    title: &str,
    age_secs: i64,
) -> String {
    let at: DateTime<Utc> = Utc::now() - Duration::seconds(age_secs);
    let remote_uri = format!("{}/posts/{}", blog.site_url, Uuid::new_v4());

    mirror::upsert_remote_post(
        pool,
        &mirror::RemotePostUpsert {
            remote_uri: remote_uri.clone(),
            remote_blog_id: blog.id,
            remote_category_id: remote_category.id,
            local_category_id,
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            content: String::new(),
            excerpt: None,
            cover_image: None,
            author_name: Some("peer".to_string()),
            remote_created_at: at,
            remote_updated_at: at,
        },
    )
    .await
    .expect("Failed to seed remote post");

    remote_uri
}
