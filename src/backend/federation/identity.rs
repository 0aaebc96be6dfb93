//! Remote identity registry.
//!
//! Stores known remote blog instances and the categories they advertise.
//! Rows are created lazily on first webhook or first remote-category fetch
//! from an unseen origin, and never deleted automatically.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::federation::urls::normalize_site_url;
use crate::shared::models::{RemoteBlog, RemoteCategory};

fn remote_blog_from_row(row: &sqlx::sqlite::SqliteRow) -> RemoteBlog {
    RemoteBlog {
        id: row.get("id"),
        site_url: row.get("site_url"),
        display_name: row.get("display_name"),
        blog_title: row.get("blog_title"),
        avatar_url: row.get("avatar_url"),
        last_fetched_at: row.get("last_fetched_at"),
    }
}

fn remote_category_from_row(row: &sqlx::sqlite::SqliteRow) -> RemoteCategory {
    RemoteCategory {
        id: row.get("id"),
        remote_blog_id: row.get("remote_blog_id"),
        remote_id: row.get("remote_id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}

/// Look up a remote blog by its canonical origin, creating it on first
/// contact. Known metadata (display name, title, avatar) refreshes the
/// stored row when provided.
pub async fn get_or_create_remote_blog(
    pool: &SqlitePool,
    site_url: &str,
    display_name: Option<&str>,
    blog_title: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<RemoteBlog, sqlx::Error> {
    let site_url = normalize_site_url(site_url);
    let now = Utc::now();

    let existing = sqlx::query(
        r#"
        SELECT id, site_url, display_name, blog_title, avatar_url, last_fetched_at
        FROM remote_blogs
        WHERE site_url = ?
        "#,
    )
    .bind(&site_url)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = existing {
        let blog = remote_blog_from_row(&row);
        sqlx::query(
            r#"
            UPDATE remote_blogs
            SET display_name = COALESCE(?, display_name),
                blog_title = COALESCE(?, blog_title),
                avatar_url = COALESCE(?, avatar_url),
                last_fetched_at = ?
            WHERE id = ?
            "#,
        )
        .bind(display_name)
        .bind(blog_title)
        .bind(avatar_url)
        .bind(now)
        .bind(blog.id)
        .execute(pool)
        .await?;

        return Ok(RemoteBlog {
            display_name: display_name.map(String::from).or(blog.display_name),
            blog_title: blog_title.map(String::from).or(blog.blog_title),
            avatar_url: avatar_url.map(String::from).or(blog.avatar_url),
            last_fetched_at: Some(now),
            ..blog
        });
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO remote_blogs (id, site_url, display_name, blog_title, avatar_url, last_fetched_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(&site_url)
    .bind(display_name)
    .bind(blog_title)
    .bind(avatar_url)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!("[Federation] Registered remote blog {}", site_url);

    Ok(RemoteBlog {
        id,
        site_url,
        display_name: display_name.map(String::from),
        blog_title: blog_title.map(String::from),
        avatar_url: avatar_url.map(String::from),
        last_fetched_at: Some(now),
    })
}

/// Get a remote blog by id
pub async fn get_remote_blog(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<RemoteBlog>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, site_url, display_name, blog_title, avatar_url, last_fetched_at
        FROM remote_blogs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(remote_blog_from_row))
}

/// Look up a remote category by `(remote_blog_id, remote_id)`, creating it
/// on first contact. `remote_id` is the category's identifier on the
/// remote side and is never reused as a local id.
pub async fn get_or_create_remote_category(
    pool: &SqlitePool,
    remote_blog_id: Uuid,
    remote_id: &str,
    name: &str,
    slug: &str,
) -> Result<RemoteCategory, sqlx::Error> {
    let existing = sqlx::query(
        r#"
        SELECT id, remote_blog_id, remote_id, name, slug
        FROM remote_categories
        WHERE remote_blog_id = ? AND remote_id = ?
        "#,
    )
    .bind(remote_blog_id)
    .bind(remote_id)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = existing {
        return Ok(remote_category_from_row(&row));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO remote_categories (id, remote_blog_id, remote_id, name, slug)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(remote_blog_id)
    .bind(remote_id)
    .bind(name)
    .bind(slug)
    .execute(pool)
    .await?;

    Ok(RemoteCategory {
        id,
        remote_blog_id,
        remote_id: remote_id.to_string(),
        name: name.to_string(),
        slug: slug.to_string(),
    })
}

/// Get a remote category by id
pub async fn get_remote_category(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<RemoteCategory>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, remote_blog_id, remote_id, name, slug
        FROM remote_categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(remote_category_from_row))
}
