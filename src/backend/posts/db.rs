//! Database operations for categories and locally authored posts.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::shared::models::{Category, Post, PostStatus};

fn category_from_row(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        is_public: row.get("is_public"),
        created_at: row.get("created_at"),
    }
}

fn post_from_row(row: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        category_id: row.get("category_id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        excerpt: row.get("excerpt"),
        cover_image: row.get("cover_image"),
        author_name: row.get("author_name"),
        status: PostStatus::from_str(row.get::<String, _>("status").as_str())
            .unwrap_or(PostStatus::Draft),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const POST_COLUMNS: &str = "id, category_id, title, slug, content, excerpt, cover_image, author_name, status, created_at, updated_at";

/// Create a category
pub async fn create_category(
    pool: &SqlitePool,
    name: &str,
    slug: &str,
    description: Option<&str>,
    is_public: bool,
) -> Result<Category, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO categories (id, name, slug, description, is_public, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(slug)
    .bind(description)
    .bind(is_public)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Category {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        description: description.map(String::from),
        is_public,
        created_at: now,
    })
}

/// Get a category by id
pub async fn get_category(pool: &SqlitePool, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, name, slug, description, is_public, created_at FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(category_from_row))
}

/// Public categories, as advertised to federation peers
pub async fn list_public_categories(pool: &SqlitePool) -> Result<Vec<Category>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, slug, description, is_public, created_at
        FROM categories
        WHERE is_public = 1
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(category_from_row).collect())
}

/// Create a new post in draft state
#[allow(clippy::too_many_arguments)]
pub async fn create_post(
    pool: &SqlitePool,
    category_id: Option<Uuid>,
    title: &str,
    slug: &str,
    content: &str,
    excerpt: Option<&str>,
    cover_image: Option<&str>,
    author_name: &str,
) -> Result<Post, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO posts (id, category_id, title, slug, content, excerpt, cover_image, author_name, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'draft', ?, ?)
        "#,
    )
    .bind(id)
    .bind(category_id)
    .bind(title)
    .bind(slug)
    .bind(content)
    .bind(excerpt)
    .bind(cover_image)
    .bind(author_name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Post {
        id,
        category_id,
        title: title.to_string(),
        slug: slug.to_string(),
        content: content.to_string(),
        excerpt: excerpt.map(String::from),
        cover_image: cover_image.map(String::from),
        author_name: author_name.to_string(),
        status: PostStatus::Draft,
        created_at: now,
        updated_at: now,
    })
}

/// Update a post's content fields, bumping `updated_at`
#[allow(clippy::too_many_arguments)]
pub async fn update_post(
    pool: &SqlitePool,
    id: Uuid,
    category_id: Option<Uuid>,
    title: &str,
    content: &str,
    excerpt: Option<&str>,
    cover_image: Option<&str>,
) -> Result<Option<Post>, sqlx::Error> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET category_id = ?, title = ?, content = ?, excerpt = ?, cover_image = ?, updated_at = ?
        WHERE id = ? AND status != 'deleted'
        "#,
    )
    .bind(category_id)
    .bind(title)
    .bind(content)
    .bind(excerpt)
    .bind(cover_image)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_post(pool, id).await
}

/// Transition a post's lifecycle status, bumping `updated_at`
pub async fn set_post_status(
    pool: &SqlitePool,
    id: Uuid,
    status: PostStatus,
) -> Result<Option<Post>, sqlx::Error> {
    let result = sqlx::query("UPDATE posts SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_post(pool, id).await
}

/// Get a post by id
pub async fn get_post(pool: &SqlitePool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(post_from_row))
}

/// Get a post only if it is published; the shape served to federation
/// peers.
pub async fn get_published_post(pool: &SqlitePool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE id = ? AND status = 'published'"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(post_from_row))
}

/// Published posts of a category, optionally only those updated after
/// `since` (the consumer's sync watermark), newest first.
pub async fn list_published_posts(
    pool: &SqlitePool,
    category_id: Uuid,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<Post>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM posts
        WHERE category_id = ? AND status = 'published'
          AND (?2 IS NULL OR updated_at > ?2)
        ORDER BY created_at DESC
        "#
    ))
    .bind(category_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(post_from_row).collect())
}
