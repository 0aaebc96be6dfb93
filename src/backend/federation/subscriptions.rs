//! Consumer-side subscription registry.
//!
//! Tracks which local category mirrors which remote category. Exactly one
//! active subscription may exist per local/remote category pair; renewing
//! a severed link reactivates the existing row rather than duplicating it.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::shared::models::CategorySubscription;

fn subscription_from_row(row: &sqlx::sqlite::SqliteRow) -> CategorySubscription {
    CategorySubscription {
        id: row.get("id"),
        local_category_id: row.get("local_category_id"),
        remote_category_id: row.get("remote_category_id"),
        is_active: row.get("is_active"),
        last_synced_at: row.get("last_synced_at"),
        created_at: row.get("created_at"),
    }
}

/// Create or reactivate the subscription for a local/remote category pair.
pub async fn upsert_subscription(
    pool: &SqlitePool,
    local_category_id: Uuid,
    remote_category_id: Uuid,
) -> Result<CategorySubscription, sqlx::Error> {
    let existing = sqlx::query(
        r#"
        SELECT id, local_category_id, remote_category_id, is_active, last_synced_at, created_at
        FROM category_subscriptions
        WHERE local_category_id = ? AND remote_category_id = ?
        "#,
    )
    .bind(local_category_id)
    .bind(remote_category_id)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = existing {
        let subscription = subscription_from_row(&row);
        if !subscription.is_active {
            sqlx::query("UPDATE category_subscriptions SET is_active = 1 WHERE id = ?")
                .bind(subscription.id)
                .execute(pool)
                .await?;
        }
        return Ok(CategorySubscription {
            is_active: true,
            ..subscription
        });
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO category_subscriptions (id, local_category_id, remote_category_id, is_active, last_synced_at, created_at)
        VALUES (?, ?, ?, 1, NULL, ?)
        "#,
    )
    .bind(id)
    .bind(local_category_id)
    .bind(remote_category_id)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(CategorySubscription {
        id,
        local_category_id,
        remote_category_id,
        is_active: true,
        last_synced_at: None,
        created_at: now,
    })
}

/// Get a subscription by id
pub async fn get_subscription(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<CategorySubscription>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, local_category_id, remote_category_id, is_active, last_synced_at, created_at
        FROM category_subscriptions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(subscription_from_row))
}

/// The active subscription (if any) mapping a remote category to a local
/// one. Used by the webhook receiver to attach mirrored posts.
pub async fn find_active_by_remote_category(
    pool: &SqlitePool,
    remote_category_id: Uuid,
) -> Result<Option<CategorySubscription>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, local_category_id, remote_category_id, is_active, last_synced_at, created_at
        FROM category_subscriptions
        WHERE remote_category_id = ? AND is_active = 1
        "#,
    )
    .bind(remote_category_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(subscription_from_row))
}

/// All active subscriptions, in creation order. The batch sync pass
/// processes these strictly sequentially.
pub async fn list_active_subscriptions(
    pool: &SqlitePool,
) -> Result<Vec<CategorySubscription>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, local_category_id, remote_category_id, is_active, last_synced_at, created_at
        FROM category_subscriptions
        WHERE is_active = 1
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(subscription_from_row).collect())
}

/// Advance the sync watermark. Called after a pull cycle has processed its
/// page, success or partial success; the provider's `since` filter is
/// advancing state, not a transaction boundary.
pub async fn set_last_synced(
    pool: &SqlitePool,
    id: Uuid,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE category_subscriptions SET last_synced_at = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
