//! Consumer-side pull-sync worker.
//!
//! Reconciles subscribed remote categories into the local mirror. Three
//! things drive a sync: the periodic timer ([`spawn_sync_timer`]), the
//! feed's staleness trigger ([`trigger_stale_syncs`]), and the admin
//! "sync now" action ([`sync_all_subscriptions`]). Webhooks only hint that
//! content changed; the pull path is the source of truth.
//!
//! A provider answering `403 {"error": "ERR_SUBSCRIPTION_REVOKED"}` has
//! explicitly cut this instance off: the revocation handler deactivates
//! the subscription and marks its mirrored posts unreachable before the
//! error is re-raised. Timeouts and other network failures never infer
//! revocation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::federation::mirror::{self, RemotePostUpsert};
use crate::backend::federation::{identity, subscriptions, urls};
use crate::backend::server::state::AppState;
use crate::shared::federation::{
    FederatedPost, SyncReport, ERR_SUBSCRIPTION_REVOKED, SUBSCRIBER_URL_HEADER,
};
use crate::shared::models::CategorySubscription;

/// Bound on a single pull request.
const PULL_TIMEOUT: Duration = Duration::from_secs(15);

/// A subscription is stale once its watermark is older than this.
const STALE_AFTER_SECS: i64 = 180;

/// Cooldown before the same subscription may be stale-triggered again.
const TRIGGER_COOLDOWN: Duration = Duration::from_secs(30);

/// Delay before the first periodic pass, so startup can complete.
const FIRST_PASS_DELAY: Duration = Duration::from_secs(5);

/// Process-local, time-evicting set of subscription ids recently queued
/// for sync. Keeps a burst of feed reads from re-triggering the same
/// subscription; entries expire after a fixed cooldown and are pruned on
/// access. Never persisted.
#[derive(Clone)]
pub struct SyncTriggerGuard {
    entries: Arc<Mutex<HashMap<Uuid, Instant>>>,
    cooldown: Duration,
}

impl SyncTriggerGuard {
    pub fn new() -> Self {
        Self::with_cooldown(TRIGGER_COOLDOWN)
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            cooldown,
        }
    }

    /// Claim the right to trigger a sync for `id`. Returns false while a
    /// previous claim's cooldown is still running.
    pub fn try_acquire(&self, id: Uuid) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, expiry| *expiry > now);

        if entries.contains_key(&id) {
            return false;
        }
        entries.insert(id, now + self.cooldown);
        true
    }
}

impl Default for SyncTriggerGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull one subscription's remote category and reconcile it into the
/// mirror. Returns the number of posts upserted.
///
/// The watermark is stamped after the returned page is processed, success
/// or partial success, so the next pull's `since` filter advances.
pub async fn sync_subscription(
    state: &AppState,
    subscription_id: Uuid,
) -> Result<u32, BackendError> {
    let subscription = subscriptions::get_subscription(&state.db_pool, subscription_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Subscription not found"))?;

    if !subscription.is_active {
        return Err(BackendError::bad_request("Subscription is not active"));
    }

    let remote_category =
        identity::get_remote_category(&state.db_pool, subscription.remote_category_id)
            .await?
            .ok_or_else(|| BackendError::not_found("Remote category not found"))?;
    let remote_blog = identity::get_remote_blog(&state.db_pool, remote_category.remote_blog_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Remote blog not found"))?;

    let mut url = format!(
        "{}/api/federation/categories/{}/posts",
        remote_blog.site_url, remote_category.remote_id
    );
    if let Some(since) = subscription.last_synced_at {
        // Z-suffixed so the '+' of a numeric offset can't be eaten by
        // query-string decoding on the provider side.
        url.push_str(&format!(
            "?since={}",
            since.to_rfc3339_opts(SecondsFormat::Millis, true)
        ));
    }

    tracing::debug!("[Sync] Pulling {}", url);

    let response = state
        .http
        .get(&url)
        .header(SUBSCRIBER_URL_HEADER, &state.site.site_url)
        .timeout(PULL_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if status == reqwest::StatusCode::FORBIDDEN {
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        if body.get("error").and_then(|v| v.as_str()) == Some(ERR_SUBSCRIPTION_REVOKED) {
            handle_revocation(&state.db_pool, &subscription).await?;
            return Err(BackendError::revoked(format!(
                "subscription {} revoked by {}",
                subscription.id, remote_blog.site_url
            )));
        }
        return Err(BackendError::RemoteRejected {
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        return Err(BackendError::RemoteRejected {
            status: status.as_u16(),
        });
    }

    let posts: Vec<FederatedPost> = response.json().await?;
    let mut upserted = 0u32;

    for post in &posts {
        let remote_uri =
            urls::canonicalize_remote_uri(post.uri.as_deref(), &remote_blog.site_url, &post.id);
        let upsert = RemotePostUpsert {
            remote_uri,
            remote_blog_id: remote_blog.id,
            remote_category_id: remote_category.id,
            local_category_id: Some(subscription.local_category_id),
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: urls::rewrite_relative_urls(&post.content, &remote_blog.site_url),
            excerpt: post.excerpt.clone(),
            cover_image: post
                .cover_image
                .as_deref()
                .map(|c| urls::absolutize(c, &remote_blog.site_url)),
            author_name: post.author_name.clone(),
            remote_created_at: post.created_at,
            remote_updated_at: post.updated_at,
        };

        match mirror::upsert_remote_post(&state.db_pool, &upsert).await {
            Ok(()) => upserted += 1,
            Err(e) => {
                tracing::warn!(
                    "[Sync] Failed to upsert {} for subscription {}: {:?}",
                    upsert.remote_uri,
                    subscription.id,
                    e
                );
            }
        }
    }

    subscriptions::set_last_synced(&state.db_pool, subscription.id, Utc::now()).await?;

    tracing::info!(
        "[Sync] Subscription {}: {} post(s) reconciled from {}",
        subscription.id,
        upserted,
        remote_blog.site_url
    );

    Ok(upserted)
}

/// Apply a provider's explicit revocation: deactivate the subscription and
/// mark every mirrored post of its remote category unreachable. Both
/// effects commit together; running it twice is harmless.
pub async fn handle_revocation(
    pool: &SqlitePool,
    subscription: &CategorySubscription,
) -> Result<(), BackendError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE category_subscriptions SET is_active = 0 WHERE id = ?")
        .bind(subscription.id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        UPDATE remote_posts
        SET remote_status = 'unreachable'
        WHERE remote_category_id = ?
        "#,
    )
    .bind(subscription.remote_category_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::warn!(
        "[Sync] Subscription {} deactivated, mirror marked unreachable",
        subscription.id
    );

    Ok(())
}

/// Sync every active subscription, strictly sequentially. One
/// subscription's failure is logged and never aborts the rest; an
/// unreachable remote blog must not stall sync for all others.
pub async fn sync_all_subscriptions(state: &AppState) -> Result<SyncReport, BackendError> {
    let subscriptions = subscriptions::list_active_subscriptions(&state.db_pool).await?;
    let mut report = SyncReport::default();

    for subscription in subscriptions {
        match sync_subscription(state, subscription.id).await {
            Ok(_) => report.synced += 1,
            Err(e) if e.is_revocation() => {
                tracing::warn!("[Sync] {}", e);
                report.revoked += 1;
            }
            Err(e) => {
                tracing::error!("[Sync] Subscription {} failed: {}", subscription.id, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Queue syncs for stale subscriptions, detached from the serving request.
///
/// Invoked when a feed page containing remote content is served. The read
/// itself returns immediately with whatever is mirrored; this only decides
/// whether fresher data should be fetched for next time.
pub fn trigger_stale_syncs(state: AppState) {
    tokio::spawn(async move {
        let subs = match subscriptions::list_active_subscriptions(&state.db_pool).await {
            Ok(subs) => subs,
            Err(e) => {
                tracing::error!("[Sync] Failed to list subscriptions: {:?}", e);
                return;
            }
        };

        let now = Utc::now();
        for sub in subs {
            let stale = sub
                .last_synced_at
                .map_or(true, |t| (now - t).num_seconds() > STALE_AFTER_SECS);
            if !stale {
                continue;
            }
            if !state.sync_guard.try_acquire(sub.id) {
                continue;
            }

            if let Err(e) = sync_subscription(&state, sub.id).await {
                if e.is_revocation() {
                    tracing::warn!("[Sync] Stale-trigger: {}", e);
                } else {
                    tracing::warn!("[Sync] Stale-trigger for {} failed: {}", sub.id, e);
                }
            }
        }
    });
}

/// Start the periodic pull-sync task: a one-time delayed first pass, then
/// one pass every configured interval.
pub fn spawn_sync_timer(state: AppState) {
    let interval = Duration::from_secs(state.site.sync_interval_minutes * 60);

    tokio::spawn(async move {
        tokio::time::sleep(FIRST_PASS_DELAY).await;

        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match sync_all_subscriptions(&state).await {
                Ok(report) => {
                    if report.synced + report.failed + report.revoked > 0 {
                        tracing::info!(
                            "[Sync] Periodic pass: {} synced, {} failed, {} revoked",
                            report.synced,
                            report.failed,
                            report.revoked
                        );
                    }
                }
                Err(e) => tracing::error!("[Sync] Periodic pass failed: {}", e),
            }
        }
    });
}
