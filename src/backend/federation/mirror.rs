//! The remote-post mirror table.
//!
//! Every mirrored post is keyed by `remote_uri`, the sole cross-instance
//! idempotency key: whether a row arrives via webhook push or pull
//! reconciliation, the same URI always lands on the same row. Rows are
//! never hard-deleted; lifecycle transitions flip `remote_status` so old
//! feed pages stay stable.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::shared::models::{RemotePost, RemoteStatus};

/// Field set for an upsert into the mirror. Built by the pull-sync worker
/// and the webhook receiver from a wire-format post whose URLs have
/// already been rewritten to the canonical remote origin.
#[derive(Debug, Clone)]
pub struct RemotePostUpsert {
    pub remote_uri: String,
    pub remote_blog_id: Uuid,
    pub remote_category_id: Uuid,
    pub local_category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub author_name: Option<String>,
    pub remote_created_at: DateTime<Utc>,
    pub remote_updated_at: DateTime<Utc>,
}

pub fn remote_post_from_row(row: &sqlx::sqlite::SqliteRow) -> RemotePost {
    RemotePost {
        id: row.get("id"),
        remote_uri: row.get("remote_uri"),
        remote_blog_id: row.get("remote_blog_id"),
        remote_category_id: row.get("remote_category_id"),
        local_category_id: row.get("local_category_id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        excerpt: row.get("excerpt"),
        cover_image: row.get("cover_image"),
        remote_status: RemoteStatus::from_str(row.get::<String, _>("remote_status").as_str())
            .unwrap_or(RemoteStatus::Published),
        author_name: row.get("author_name"),
        remote_created_at: row.get("remote_created_at"),
        remote_updated_at: row.get("remote_updated_at"),
        fetched_at: row.get("fetched_at"),
    }
}

/// Insert or update a mirrored post by `remote_uri`, as one self-contained
/// write. A refreshed row always returns to `published`.
pub async fn upsert_remote_post(
    pool: &SqlitePool,
    upsert: &RemotePostUpsert,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO remote_posts (
            id, remote_uri, remote_blog_id, remote_category_id, local_category_id,
            title, slug, content, excerpt, cover_image,
            remote_status, author_name, remote_created_at, remote_updated_at, fetched_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'published', ?, ?, ?, ?)
        ON CONFLICT(remote_uri) DO UPDATE SET
            remote_blog_id = excluded.remote_blog_id,
            remote_category_id = excluded.remote_category_id,
            local_category_id = excluded.local_category_id,
            title = excluded.title,
            slug = excluded.slug,
            content = excluded.content,
            excerpt = excluded.excerpt,
            cover_image = excluded.cover_image,
            remote_status = 'published',
            author_name = excluded.author_name,
            remote_created_at = excluded.remote_created_at,
            remote_updated_at = excluded.remote_updated_at,
            fetched_at = excluded.fetched_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&upsert.remote_uri)
    .bind(upsert.remote_blog_id)
    .bind(upsert.remote_category_id)
    .bind(upsert.local_category_id)
    .bind(&upsert.title)
    .bind(&upsert.slug)
    .bind(&upsert.content)
    .bind(&upsert.excerpt)
    .bind(&upsert.cover_image)
    .bind(&upsert.author_name)
    .bind(upsert.remote_created_at)
    .bind(upsert.remote_updated_at)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a mirrored post by its canonical URI
pub async fn get_remote_post_by_uri(
    pool: &SqlitePool,
    remote_uri: &str,
) -> Result<Option<RemotePost>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, remote_uri, remote_blog_id, remote_category_id, local_category_id,
               title, slug, content, excerpt, cover_image,
               remote_status, author_name, remote_created_at, remote_updated_at, fetched_at
        FROM remote_posts
        WHERE remote_uri = ?
        "#,
    )
    .bind(remote_uri)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(remote_post_from_row))
}

/// Transition a mirrored post to `deleted` on an explicit delete or
/// unpublish notification from its provider.
pub async fn mark_remote_post_deleted(
    pool: &SqlitePool,
    remote_uri: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE remote_posts
        SET remote_status = 'deleted', fetched_at = ?
        WHERE remote_uri = ?
        "#,
    )
    .bind(Utc::now())
    .bind(remote_uri)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
