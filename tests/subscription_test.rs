//! Consumer-side subscription lifecycle tests.
//!
//! Subscribing to a remote category is an exchange: fetch the provider's
//! identity and categories, register as a subscriber, and only then record
//! the subscription locally. A failed exchange must leave no local state.

mod common;

use axum::http::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_provider_discovery(provider: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/federation/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "siteUrl": provider.uri(),
            "displayName": "Peer",
            "blogTitle": "Peer Blog",
            "blogDescription": "",
            "avatarUrl": null,
            "blogHandle": "peer"
        })))
        .mount(provider)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/federation/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "cat-1", "name": "News", "slug": "news", "description": null }
        ])))
        .mount(provider)
        .await;
}

#[tokio::test]
async fn test_subscribe_remote_registers_then_records() {
    let provider = MockServer::start().await;
    mount_provider_discovery(&provider).await;
    Mock::given(method("POST"))
        .and(path("/api/federation/subscribe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true, "subscriberId": uuid::Uuid::new_v4()
        })))
        .expect(1)
        .mount(&provider)
        .await;
    // Initial background sync after subscribing
    Mock::given(method("GET"))
        .and(path("/api/federation/categories/cat-1/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&provider)
        .await;

    let state = common::test_state().await;
    let pool = state.db_pool.clone();
    let category = common::seed_category(&pool, "Local", true).await;
    let server = common::test_server(state);

    let response = server
        .post("/api/federation/subscriptions")
        .json(&serde_json::json!({
            "remoteSiteUrl": format!("{}/", provider.uri()),
            "remoteCategoryId": "cat-1",
            "localCategoryId": category.id
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["local_category_id"], category.id.to_string());
    assert_eq!(body["is_active"], true);

    // The remote blog was recorded under its normalized origin
    let site_url: String = sqlx::query_scalar("SELECT site_url FROM remote_blogs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(site_url, provider.uri());
}

#[tokio::test]
async fn test_subscribe_remote_rejected_leaves_no_state() {
    let provider = MockServer::start().await;
    mount_provider_discovery(&provider).await;
    Mock::given(method("POST"))
        .and(path("/api/federation/subscribe"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&provider)
        .await;

    let state = common::test_state().await;
    let pool = state.db_pool.clone();
    let category = common::seed_category(&pool, "Local", true).await;
    let server = common::test_server(state);

    let response = server
        .post("/api/federation/subscriptions")
        .json(&serde_json::json!({
            "remoteSiteUrl": provider.uri(),
            "remoteCategoryId": "cat-1",
            "localCategoryId": category.id
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);

    let blogs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM remote_blogs")
        .fetch_one(&pool)
        .await
        .unwrap();
    let subs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category_subscriptions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(blogs, 0);
    assert_eq!(subs, 0);
}

#[tokio::test]
async fn test_subscribe_remote_unknown_category_is_not_found() {
    let provider = MockServer::start().await;
    mount_provider_discovery(&provider).await;

    let state = common::test_state().await;
    let category = common::seed_category(&state.db_pool, "Local", true).await;
    let server = common::test_server(state);

    let response = server
        .post("/api/federation/subscriptions")
        .json(&serde_json::json!({
            "remoteSiteUrl": provider.uri(),
            "remoteCategoryId": "no-such-category",
            "localCategoryId": category.id
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsubscribe_remote_severs_and_retires_mirror() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/federation/unsubscribe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })))
        .mount(&provider)
        .await;

    let state = common::test_state().await;
    let pool = state.db_pool.clone();

    let category = common::seed_category(&pool, "Local", true).await;
    let (blog, remote_category) =
        common::seed_remote_identity(&pool, &provider.uri(), "cat-1").await;
    let subscription = common::seed_subscription(&pool, category.id, remote_category.id).await;
    common::seed_remote_post(&pool, &blog, &remote_category, Some(category.id), "Mirrored", 60)
        .await;

    let server = common::test_server(state);
    let response = server
        .delete(&format!("/api/federation/subscriptions/{}", subscription.id))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let is_active: bool =
        sqlx::query_scalar("SELECT is_active FROM category_subscriptions WHERE id = ?")
            .bind(subscription.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!is_active);

    let status: String = sqlx::query_scalar("SELECT remote_status FROM remote_posts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "unreachable");
}

#[tokio::test]
async fn test_sync_now_reports_batch_outcome() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/federation/categories/cat-1/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&provider)
        .await;

    let state = common::test_state().await;
    let pool = state.db_pool.clone();
    let category = common::seed_category(&pool, "Local", true).await;
    let (_, remote_category) = common::seed_remote_identity(&pool, &provider.uri(), "cat-1").await;
    common::seed_subscription(&pool, category.id, remote_category.id).await;

    let server = common::test_server(state);
    let response = server.post("/api/federation/sync").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["synced"], 1);
    assert_eq!(body["failed"], 0);
    assert_eq!(body["revoked"], 0);
}
