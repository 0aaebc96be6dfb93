//! Provider-side webhook dispatcher.
//!
//! On a local post's status transition (published, updated while
//! published, unpublished, deleted) with a non-null category, one
//! notification goes to every currently-active subscriber of that
//! category. Each delivery is an independent best-effort POST on a
//! detached task: failures are logged and swallowed per-recipient, and the
//! triggering request never waits. There is no retry queue; the
//! subscriber's pull-sync is the durability backstop.

use std::time::Duration;

use crate::backend::federation::{subscribers, urls};
use crate::backend::server::state::AppState;
use crate::shared::federation::WebhookPayload;
use crate::shared::models::Post;

/// Timeout for a single webhook delivery. Slow subscribers only cost the
/// detached task, never the caller.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Notify all active subscribers of the post's category of a lifecycle
/// event. Fire-and-forget: the caller's mutation has already committed, so
/// nothing here may fail the request.
pub fn dispatch_post_event(state: &AppState, event: &'static str, post: &Post) {
    let Some(category_id) = post.category_id else {
        return;
    };

    let payload = WebhookPayload {
        event: event.to_string(),
        post: urls::project_post(post, &state.site.site_url),
        category_id: category_id.to_string(),
        site_url: state.site.site_url.clone(),
    };

    let state = state.clone();
    tokio::spawn(async move {
        let targets = match subscribers::active_subscribers_for_category(
            &state.db_pool,
            category_id,
        )
        .await
        {
            Ok(targets) => targets,
            Err(e) => {
                tracing::error!("[Webhook] Failed to load subscribers: {:?}", e);
                return;
            }
        };

        if targets.is_empty() {
            return;
        }

        tracing::debug!(
            "[Webhook] Dispatching {} to {} subscriber(s) of category {}",
            payload.event,
            targets.len(),
            category_id
        );

        for subscriber in targets {
            let delivery = state
                .http
                .post(&subscriber.callback_url)
                .timeout(DELIVERY_TIMEOUT)
                .json(&payload)
                .send()
                .await;

            match delivery {
                Ok(resp) if !resp.status().is_success() => {
                    tracing::warn!(
                        "[Webhook] {} answered {} for {}",
                        subscriber.subscriber_url,
                        resp.status(),
                        payload.event
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        "[Webhook] Delivery to {} failed: {}",
                        subscriber.subscriber_url,
                        e
                    );
                }
            }
        }
    });
}

/// Emit a human-readable alert to the external notification channel, if
/// one is configured. Non-blocking; purely informational.
pub fn notify_subscription_alert(state: &AppState, category_name: &str, subscriber_url: &str) {
    let Some(notify_url) = state.site.notify_webhook_url.clone() else {
        return;
    };

    let text = format!("New federation subscriber for '{category_name}': {subscriber_url}");
    let http = state.http.clone();

    tokio::spawn(async move {
        let result = http
            .post(&notify_url)
            .timeout(DELIVERY_TIMEOUT)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await;

        if let Err(e) = result {
            tracing::warn!("[Webhook] Subscription alert failed: {}", e);
        }
    });
}
