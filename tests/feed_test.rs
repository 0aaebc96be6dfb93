//! Combined feed integration tests.
//!
//! The feed must interleave local and mirrored posts newest-first, page
//! without duplicates or gaps, and exclude drafts, unmapped remote rows,
//! and anything not in the published state.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

#[tokio::test]
async fn test_feed_interleaves_sources_newest_first() {
    let state = common::test_state().await;
    let pool = state.db_pool.clone();

    let category = common::seed_category(&pool, "Mixed", true).await;
    common::seed_published_post(&pool, category.id, "Local old", 300).await;
    common::seed_published_post(&pool, category.id, "Local new", 30).await;

    let (blog, remote_category) =
        common::seed_remote_identity(&pool, "http://peer.example", "cat-1").await;
    common::seed_remote_post(&pool, &blog, &remote_category, Some(category.id), "Remote mid", 120)
        .await;

    let server = common::test_server(state);
    let response = server.get("/api/feed").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 3);

    let titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Local new", "Remote mid", "Local old"]);

    let sources: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["source"].as_str().unwrap())
        .collect();
    assert_eq!(sources, vec!["local", "remote", "local"]);
}

#[tokio::test]
async fn test_feed_pages_have_no_duplicates_or_gaps() {
    let state = common::test_state().await;
    let pool = state.db_pool.clone();

    let category = common::seed_category(&pool, "Mixed", true).await;
    let (blog, remote_category) =
        common::seed_remote_identity(&pool, "http://peer.example", "cat-1").await;

    // 13 posts alternating sources, distinct timestamps
    for i in 0..13i64 {
        if i % 2 == 0 {
            common::seed_published_post(&pool, category.id, &format!("Post {i}"), i * 60).await;
        } else {
            common::seed_remote_post(
                &pool,
                &blog,
                &remote_category,
                Some(category.id),
                &format!("Post {i}"),
                i * 60,
            )
            .await;
        }
    }

    let server = common::test_server(state);
    let mut seen = HashSet::new();
    let mut fetched = 0u64;

    for page in 1..=3 {
        let response = server
            .get("/api/feed")
            .add_query_param("page", page)
            .add_query_param("per_page", 5)
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body: serde_json::Value = response.json();
        assert_eq!(body["total"], 13);

        for item in body["items"].as_array().unwrap() {
            let id = item["id"].as_str().unwrap().to_string();
            assert!(seen.insert(id), "duplicate item across pages");
            fetched += 1;
        }
    }

    assert_eq!(fetched, 13);

    // Past the end: empty but well-formed
    let response = server
        .get("/api/feed")
        .add_query_param("page", 4)
        .add_query_param("per_page", 5)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 13);
}

#[tokio::test]
async fn test_feed_tolerates_extreme_page_numbers() {
    let state = common::test_state().await;
    let pool = state.db_pool.clone();

    let category = common::seed_category(&pool, "Mixed", true).await;
    common::seed_published_post(&pool, category.id, "Only", 10).await;

    let server = common::test_server(state);

    // Any page request yields a well-formed (possibly empty) page, even
    // at the top of the u32 range
    let response = server
        .get("/api/feed")
        .add_query_param("page", u32::MAX)
        .add_query_param("per_page", 50)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], u32::MAX);
}

#[tokio::test]
async fn test_feed_excludes_drafts_and_unmapped_remote_posts() {
    let state = common::test_state().await;
    let pool = state.db_pool.clone();

    let category = common::seed_category(&pool, "Mixed", true).await;
    common::seed_published_post(&pool, category.id, "Kept", 10).await;

    zlog::backend::posts::db::create_post(
        &pool,
        Some(category.id),
        "Draft",
        "draft",
        "",
        None,
        None,
        "tester",
    )
    .await
    .unwrap();

    let (blog, remote_category) =
        common::seed_remote_identity(&pool, "http://peer.example", "cat-1").await;
    // Mirrored but never mapped to a local category
    common::seed_remote_post(&pool, &blog, &remote_category, None, "Orphan", 20).await;
    // Mapped, then deleted upstream
    let uri =
        common::seed_remote_post(&pool, &blog, &remote_category, Some(category.id), "Gone", 30)
            .await;
    zlog::backend::federation::mirror::mark_remote_post_deleted(&pool, &uri)
        .await
        .unwrap();

    let server = common::test_server(state);
    let body: serde_json::Value = server.get("/api/feed").await.json();

    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["title"], "Kept");
}

#[tokio::test]
async fn test_feed_category_filter_spans_both_sources() {
    let state = common::test_state().await;
    let pool = state.db_pool.clone();

    let wanted = common::seed_category(&pool, "Wanted", true).await;
    let other = common::seed_category(&pool, "Other", true).await;
    common::seed_published_post(&pool, wanted.id, "Local wanted", 10).await;
    common::seed_published_post(&pool, other.id, "Local other", 20).await;

    let (blog, remote_category) =
        common::seed_remote_identity(&pool, "http://peer.example", "cat-1").await;
    common::seed_remote_post(&pool, &blog, &remote_category, Some(wanted.id), "Remote wanted", 30)
        .await;
    common::seed_remote_post(&pool, &blog, &remote_category, Some(other.id), "Remote other", 40)
        .await;

    let server = common::test_server(state);
    let body: serde_json::Value = server
        .get("/api/feed")
        .add_query_param("category", wanted.id)
        .await
        .json();

    assert_eq!(body["total"], 2);
    for item in body["items"].as_array().unwrap() {
        assert_eq!(item["categoryName"], "Wanted");
    }
}

#[tokio::test]
async fn test_feed_tag_filter_excludes_remote_posts() {
    let state = common::test_state().await;
    let pool = state.db_pool.clone();

    let category = common::seed_category(&pool, "Mixed", true).await;
    let tagged = common::seed_published_post(&pool, category.id, "Tagged", 10).await;
    common::seed_published_post(&pool, category.id, "Untagged", 20).await;

    let tag_id = uuid::Uuid::new_v4();
    sqlx::query("INSERT INTO tags (id, name, slug) VALUES (?, 'Rust', 'rust')")
        .bind(tag_id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)")
        .bind(tagged)
        .bind(tag_id)
        .execute(&pool)
        .await
        .unwrap();

    let (blog, remote_category) =
        common::seed_remote_identity(&pool, "http://peer.example", "cat-1").await;
    common::seed_remote_post(&pool, &blog, &remote_category, Some(category.id), "Remote", 5)
        .await;

    let server = common::test_server(state);
    let body: serde_json::Value = server
        .get("/api/feed")
        .add_query_param("tag", "rust")
        .await
        .json();

    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["title"], "Tagged");
    assert_eq!(body["items"][0]["tags"][0], "Rust");
}

#[tokio::test]
async fn test_remote_items_carry_attribution() {
    let state = common::test_state().await;
    let pool = state.db_pool.clone();

    let category = common::seed_category(&pool, "Mixed", true).await;
    let (blog, remote_category) =
        common::seed_remote_identity(&pool, "http://peer.example", "cat-1").await;
    common::seed_remote_post(&pool, &blog, &remote_category, Some(category.id), "Remote", 10)
        .await;

    let server = common::test_server(state);
    let body: serde_json::Value = server.get("/api/feed").await.json();

    let item = &body["items"][0];
    assert_eq!(item["source"], "remote");
    assert_eq!(item["remoteBlog"]["siteUrl"], "http://peer.example");
    assert_eq!(item["remoteBlog"]["displayName"], "Peer");
    assert_eq!(item["commentCount"], 0);
}

#[tokio::test]
async fn test_feed_counts_local_engagement() {
    let state = common::test_state().await;
    let pool = state.db_pool.clone();

    let category = common::seed_category(&pool, "Mixed", true).await;
    let post_id = common::seed_published_post(&pool, category.id, "Discussed", 10).await;

    for i in 0..3 {
        sqlx::query(
            "INSERT INTO comments (id, post_id, author_name, content, created_at) VALUES (?, ?, 'c', ?, ?)",
        )
        .bind(uuid::Uuid::new_v4())
        .bind(post_id)
        .bind(format!("comment {i}"))
        .bind(chrono::Utc::now())
        .execute(&pool)
        .await
        .unwrap();
    }
    sqlx::query("INSERT INTO likes (id, post_id, created_at) VALUES (?, ?, ?)")
        .bind(uuid::Uuid::new_v4())
        .bind(post_id)
        .bind(chrono::Utc::now())
        .execute(&pool)
        .await
        .unwrap();

    let server = common::test_server(state);
    let body: serde_json::Value = server.get("/api/feed").await.json();

    assert_eq!(body["items"][0]["commentCount"], 3);
    assert_eq!(body["items"][0]["likeCount"], 1);
}
