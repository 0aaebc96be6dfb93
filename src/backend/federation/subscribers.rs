//! Provider-side subscriber registry.
//!
//! Tracks which remote blogs follow which local category. A subscriber's
//! identity is its site URL, stored trailing-slash-normalized so lookups
//! succeed no matter how the caller presents it.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::federation::urls::normalize_site_url;
use crate::shared::models::Subscriber;

fn subscriber_from_row(row: &sqlx::sqlite::SqliteRow) -> Subscriber {
    Subscriber {
        id: row.get("id"),
        category_id: row.get("category_id"),
        subscriber_url: row.get("subscriber_url"),
        callback_url: row.get("callback_url"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

/// Create or reactivate a subscriber for a category.
///
/// Returns the subscriber and whether this call newly created or
/// reactivated it (as opposed to refreshing an already-active row), so the
/// caller can raise a "new subscription" alert only when warranted.
pub async fn upsert_subscriber(
    pool: &SqlitePool,
    category_id: Uuid,
    subscriber_url: &str,
    callback_url: &str,
) -> Result<(Subscriber, bool), sqlx::Error> {
    let subscriber_url = normalize_site_url(subscriber_url);

    let existing = find_subscriber(pool, category_id, &subscriber_url).await?;

    if let Some(subscriber) = existing {
        let was_inactive = !subscriber.is_active;
        sqlx::query(
            r#"
            UPDATE subscribers
            SET is_active = 1, callback_url = ?
            WHERE id = ?
            "#,
        )
        .bind(callback_url)
        .bind(subscriber.id)
        .execute(pool)
        .await?;

        return Ok((
            Subscriber {
                is_active: true,
                callback_url: callback_url.to_string(),
                ..subscriber
            },
            was_inactive,
        ));
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO subscribers (id, category_id, subscriber_url, callback_url, is_active, created_at)
        VALUES (?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(id)
    .bind(category_id)
    .bind(&subscriber_url)
    .bind(callback_url)
    .bind(now)
    .execute(pool)
    .await?;

    Ok((
        Subscriber {
            id,
            category_id,
            subscriber_url,
            callback_url: callback_url.to_string(),
            is_active: true,
            created_at: now,
        },
        true,
    ))
}

/// Find a subscriber row for a category by its (normalized) site URL.
pub async fn find_subscriber(
    pool: &SqlitePool,
    category_id: Uuid,
    subscriber_url: &str,
) -> Result<Option<Subscriber>, sqlx::Error> {
    let subscriber_url = normalize_site_url(subscriber_url);
    let row = sqlx::query(
        r#"
        SELECT id, category_id, subscriber_url, callback_url, is_active, created_at
        FROM subscribers
        WHERE category_id = ? AND subscriber_url = ?
        "#,
    )
    .bind(category_id)
    .bind(&subscriber_url)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(subscriber_from_row))
}

/// Deactivate a subscriber. Returns whether a row was affected.
pub async fn deactivate_subscriber(
    pool: &SqlitePool,
    category_id: Uuid,
    subscriber_url: &str,
) -> Result<bool, sqlx::Error> {
    let subscriber_url = normalize_site_url(subscriber_url);
    let result = sqlx::query(
        r#"
        UPDATE subscribers
        SET is_active = 0
        WHERE category_id = ? AND subscriber_url = ?
        "#,
    )
    .bind(category_id)
    .bind(&subscriber_url)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// All active subscribers of a category, the webhook dispatch fan-out set.
pub async fn active_subscribers_for_category(
    pool: &SqlitePool,
    category_id: Uuid,
) -> Result<Vec<Subscriber>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, category_id, subscriber_url, callback_url, is_active, created_at
        FROM subscribers
        WHERE category_id = ? AND is_active = 1
        ORDER BY created_at ASC
        "#,
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(subscriber_from_row).collect())
}
