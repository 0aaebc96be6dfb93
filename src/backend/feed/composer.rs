//! Feed composition.
//!
//! Local posts and remote mirrors live in physically distinct tables, so
//! the composer works in two passes over one logical union:
//!
//! 1. A lightweight key pass selects only `(id, created_at)` from each
//!    source, merges and orders them in memory, and computes the total and
//!    the requested page's membership. Count and contents come from the
//!    same union, so paging through all pages visits every qualifying row
//!    exactly once.
//! 2. A hydration pass loads full records and enrichment (category names,
//!    comment/like counts, tag lists, remote-blog attribution) batched by
//!    the page's id sets, never per-row.
//!
//! A tag filter applies to local posts only and excludes all remote posts,
//! which carry no local tag associations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::error::BackendError;

const DEFAULT_PER_PAGE: u32 = 10;
const MAX_PER_PAGE: u32 = 50;

/// Which table a feed row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Local,
    Remote,
}

/// Lightweight first-pass row: just enough to order and page.
#[derive(Debug, Clone)]
pub struct FeedKey {
    pub id: Uuid,
    pub source: FeedSource,
    pub created_at: DateTime<Utc>,
}

/// Feed query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Local category filter; matches a remote row's mapped local
    /// category.
    pub category: Option<Uuid>,
    /// Free-text title search.
    pub q: Option<String>,
    /// Tag slug filter. Local posts only; remote posts are excluded
    /// entirely when set.
    pub tag: Option<String>,
}

/// Attribution block for rows mirrored from another instance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAttribution {
    pub site_url: String,
    pub display_name: Option<String>,
    pub blog_title: Option<String>,
    pub avatar_url: Option<String>,
}

/// One normalized, read-only feed row. Local and remote shapes are
/// projected into this before leaving the composer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: Uuid,
    pub source: FeedSource,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub author_name: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub comment_count: i64,
    pub like_count: i64,
    pub tags: Vec<String>,
    pub remote_blog: Option<RemoteAttribution>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Merge both sources' keys into one ordering: creation time descending,
/// id as a deterministic tie-break so identical timestamps cannot shuffle
/// between pages.
pub fn merge_keys(local: Vec<FeedKey>, remote: Vec<FeedKey>) -> Vec<FeedKey> {
    let mut keys = local;
    keys.extend(remote);
    keys.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    keys
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Compose one feed page.
pub async fn compose_feed(pool: &SqlitePool, query: &FeedQuery) -> Result<FeedPage, BackendError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    // Pass 1: key selection from both sources.
    let local_rows = sqlx::query(
        r#"
        SELECT p.id AS id, p.created_at AS created_at
        FROM posts p
        WHERE p.status = 'published'
          AND (?1 IS NULL OR p.category_id = ?1)
          AND (?2 IS NULL OR p.title LIKE '%' || ?2 || '%')
          AND (?3 IS NULL OR EXISTS (
              SELECT 1 FROM post_tags pt
              JOIN tags t ON t.id = pt.tag_id
              WHERE pt.post_id = p.id AND t.slug = ?3))
        "#,
    )
    .bind(query.category)
    .bind(&query.q)
    .bind(&query.tag)
    .fetch_all(pool)
    .await?;

    let local_keys: Vec<FeedKey> = local_rows
        .iter()
        .map(|row| FeedKey {
            id: row.get("id"),
            source: FeedSource::Local,
            created_at: row.get("created_at"),
        })
        .collect();

    // Remote posts carry no local tag associations; a tag filter
    // excludes them wholesale.
    let remote_keys: Vec<FeedKey> = if query.tag.is_none() {
        sqlx::query(
            r#"
            SELECT id, remote_created_at AS created_at
            FROM remote_posts
            WHERE remote_status = 'published'
              AND local_category_id IS NOT NULL
              AND (?1 IS NULL OR local_category_id = ?1)
              AND (?2 IS NULL OR title LIKE '%' || ?2 || '%')
            "#,
        )
        .bind(query.category)
        .bind(&query.q)
        .fetch_all(pool)
        .await?
        .iter()
        .map(|row| FeedKey {
            id: row.get("id"),
            source: FeedSource::Remote,
            created_at: row.get("created_at"),
        })
        .collect()
    } else {
        Vec::new()
    };

    let keys = merge_keys(local_keys, remote_keys);
    let total = keys.len() as u64;

    // Widen before multiplying; both values come straight from the query
    // string and u32 arithmetic would overflow on absurd page numbers.
    let start = (page as usize - 1) * per_page as usize;
    let window: Vec<&FeedKey> = keys.iter().skip(start).take(per_page as usize).collect();

    // Pass 2: hydrate only the page's rows, batched per source.
    let local_ids: Vec<Uuid> = window
        .iter()
        .filter(|k| k.source == FeedSource::Local)
        .map(|k| k.id)
        .collect();
    let remote_ids: Vec<Uuid> = window
        .iter()
        .filter(|k| k.source == FeedSource::Remote)
        .map(|k| k.id)
        .collect();

    let mut local_items = hydrate_local(pool, &local_ids).await?;
    let mut remote_items = hydrate_remote(pool, &remote_ids).await?;

    // Category names for both sources, one batched lookup.
    let category_ids: Vec<Uuid> = local_items
        .values()
        .chain(remote_items.values())
        .filter_map(|item| item.category_id)
        .collect();
    let category_names = load_category_names(pool, &category_ids).await?;

    for item in local_items.values_mut().chain(remote_items.values_mut()) {
        item.category_name = item
            .category_id
            .and_then(|id| category_names.get(&id).cloned());
    }

    let items: Vec<FeedItem> = window
        .iter()
        .filter_map(|key| match key.source {
            FeedSource::Local => local_items.remove(&key.id),
            FeedSource::Remote => remote_items.remove(&key.id),
        })
        .collect();

    Ok(FeedPage {
        items,
        total,
        page,
        per_page,
    })
}

/// Hydrate local posts by id, with batched comment/like counts and tags.
async fn hydrate_local(
    pool: &SqlitePool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, FeedItem>, BackendError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let marks = placeholders(ids.len());

    let sql = format!(
        r#"
        SELECT id, title, slug, excerpt, cover_image, author_name, category_id, created_at
        FROM posts
        WHERE id IN ({marks})
        "#
    );
    let mut rows_query = sqlx::query(&sql);
    for id in ids {
        rows_query = rows_query.bind(id);
    }
    let rows = rows_query.fetch_all(pool).await?;

    let comment_counts = load_counts(pool, "comments", ids).await?;
    let like_counts = load_counts(pool, "likes", ids).await?;
    let tags = load_tags(pool, ids).await?;

    Ok(rows
        .iter()
        .map(|row| {
            let id: Uuid = row.get("id");
            (
                id,
                FeedItem {
                    id,
                    source: FeedSource::Local,
                    title: row.get("title"),
                    slug: row.get("slug"),
                    excerpt: row.get("excerpt"),
                    cover_image: row.get("cover_image"),
                    author_name: Some(row.get("author_name")),
                    category_id: row.get("category_id"),
                    category_name: None,
                    created_at: row.get("created_at"),
                    comment_count: comment_counts.get(&id).copied().unwrap_or(0),
                    like_count: like_counts.get(&id).copied().unwrap_or(0),
                    tags: tags.get(&id).cloned().unwrap_or_default(),
                    remote_blog: None,
                },
            )
        })
        .collect())
}

/// Hydrate remote posts by id, joining their blog attribution in the same
/// batched query.
async fn hydrate_remote(
    pool: &SqlitePool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, FeedItem>, BackendError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let marks = placeholders(ids.len());

    let sql = format!(
        r#"
        SELECT rp.id AS id, rp.title AS title, rp.slug AS slug, rp.excerpt AS excerpt,
               rp.cover_image AS cover_image, rp.author_name AS author_name,
               rp.local_category_id AS local_category_id,
               rp.remote_created_at AS remote_created_at,
               rb.site_url AS site_url, rb.display_name AS display_name,
               rb.blog_title AS blog_title, rb.avatar_url AS avatar_url
        FROM remote_posts rp
        JOIN remote_blogs rb ON rb.id = rp.remote_blog_id
        WHERE rp.id IN ({marks})
        "#
    );
    let mut rows_query = sqlx::query(&sql);
    for id in ids {
        rows_query = rows_query.bind(id);
    }
    let rows = rows_query.fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| {
            let id: Uuid = row.get("id");
            (
                id,
                FeedItem {
                    id,
                    source: FeedSource::Remote,
                    title: row.get("title"),
                    slug: row.get("slug"),
                    excerpt: row.get("excerpt"),
                    cover_image: row.get("cover_image"),
                    author_name: row.get("author_name"),
                    category_id: row.get("local_category_id"),
                    category_name: None,
                    created_at: row.get("remote_created_at"),
                    comment_count: 0,
                    like_count: 0,
                    tags: Vec::new(),
                    remote_blog: Some(RemoteAttribution {
                        site_url: row.get("site_url"),
                        display_name: row.get("display_name"),
                        blog_title: row.get("blog_title"),
                        avatar_url: row.get("avatar_url"),
                    }),
                },
            )
        })
        .collect())
}

/// Batched `COUNT(*) ... GROUP BY post_id` over a post-referencing table.
async fn load_counts(
    pool: &SqlitePool,
    table: &str,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, BackendError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let marks = placeholders(ids.len());
    let sql = format!(
        "SELECT post_id, COUNT(*) AS n FROM {table} WHERE post_id IN ({marks}) GROUP BY post_id"
    );
    let mut counts_query = sqlx::query(&sql);
    for id in ids {
        counts_query = counts_query.bind(id);
    }
    let rows = counts_query.fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| (row.get::<Uuid, _>("post_id"), row.get::<i64, _>("n")))
        .collect())
}

async fn load_tags(
    pool: &SqlitePool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<String>>, BackendError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let marks = placeholders(ids.len());
    let sql = format!(
        r#"
        SELECT pt.post_id AS post_id, t.name AS name
        FROM post_tags pt
        JOIN tags t ON t.id = pt.tag_id
        WHERE pt.post_id IN ({marks})
        ORDER BY t.name ASC
        "#
    );
    let mut tags_query = sqlx::query(&sql);
    for id in ids {
        tags_query = tags_query.bind(id);
    }
    let rows = tags_query.fetch_all(pool).await?;

    let mut tags: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in rows {
        tags.entry(row.get("post_id"))
            .or_default()
            .push(row.get("name"));
    }
    Ok(tags)
}

async fn load_category_names(
    pool: &SqlitePool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, BackendError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let marks = placeholders(ids.len());
    let sql = format!("SELECT id, name FROM categories WHERE id IN ({marks})");
    let mut names_query = sqlx::query(&sql);
    for id in ids {
        names_query = names_query.bind(id);
    }
    let rows = names_query.fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| (row.get::<Uuid, _>("id"), row.get::<String, _>("name")))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(source: FeedSource, secs: i64) -> FeedKey {
        FeedKey {
            id: Uuid::new_v4(),
            source,
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_merge_orders_descending_across_sources() {
        let local = vec![key(FeedSource::Local, 100), key(FeedSource::Local, 300)];
        let remote = vec![key(FeedSource::Remote, 200), key(FeedSource::Remote, 400)];

        let merged = merge_keys(local, remote);
        let times: Vec<i64> = merged.iter().map(|k| k.created_at.timestamp()).collect();
        assert_eq!(times, vec![400, 300, 200, 100]);
    }

    #[test]
    fn test_merge_tie_break_is_deterministic() {
        let a = key(FeedSource::Local, 100);
        let b = key(FeedSource::Remote, 100);

        let once = merge_keys(vec![a.clone()], vec![b.clone()]);
        let twice = merge_keys(vec![a], vec![b]);
        let ids_once: Vec<Uuid> = once.iter().map(|k| k.id).collect();
        let ids_twice: Vec<Uuid> = twice.iter().map(|k| k.id).collect();
        assert_eq!(ids_once, ids_twice);
    }

    #[test]
    fn test_merge_preserves_every_key() {
        let local: Vec<FeedKey> = (0..7).map(|i| key(FeedSource::Local, i)).collect();
        let remote: Vec<FeedKey> = (7..12).map(|i| key(FeedSource::Remote, i)).collect();

        let merged = merge_keys(local, remote);
        assert_eq!(merged.len(), 12);

        let distinct: std::collections::HashSet<Uuid> = merged.iter().map(|k| k.id).collect();
        assert_eq!(distinct.len(), 12);
    }
}
