//! Federation wire DTOs.
//!
//! JSON shapes exchanged between instances. Field names are camelCase on the
//! wire so that any conforming implementation can interoperate regardless of
//! its internal naming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Webhook event fired when a post becomes visible to subscribers.
pub const EVENT_POST_PUBLISHED: &str = "post.published";
/// Webhook event fired when a published post is edited.
pub const EVENT_POST_UPDATED: &str = "post.updated";
/// Webhook event fired when a post is withdrawn back to draft.
pub const EVENT_POST_UNPUBLISHED: &str = "post.unpublished";
/// Webhook event fired when a post is deleted.
pub const EVENT_POST_DELETED: &str = "post.deleted";

/// Distinguished error code a provider returns when the caller's
/// subscription has been revoked. Consumers must not confuse this with a
/// generic 403.
pub const ERR_SUBSCRIPTION_REVOKED: &str = "ERR_SUBSCRIPTION_REVOKED";

/// Header a consumer uses to self-identify on provider reads. Advisory,
/// not a cryptographic credential.
pub const SUBSCRIBER_URL_HEADER: &str = "x-zlog-subscriber-url";

/// Blog identity served at `GET /api/federation/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogInfo {
    pub site_url: String,
    pub display_name: String,
    pub blog_title: String,
    pub blog_description: String,
    pub avatar_url: Option<String>,
    pub blog_handle: String,
}

/// A public category as served at `GET /api/federation/categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// A post as it travels between instances, either in a provider's post
/// list response or inside a webhook payload.
///
/// `uri` is provider-supplied and advisory; consumers rewrite it to the
/// canonical origin they know the provider by before using it as an
/// idempotency key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of an outbound webhook POST to a subscriber's callback URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub event: String,
    pub post: FederatedPost,
    /// The provider-side category id; opaque to the receiver.
    pub category_id: String,
    pub site_url: String,
}

/// `POST /api/federation/subscribe` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    /// The provider-side category id; opaque to the subscriber.
    pub category_id: String,
    pub subscriber_url: String,
    pub callback_url: String,
}

/// `POST /api/federation/unsubscribe` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeRequest {
    pub category_id: String,
    pub subscriber_url: String,
}

/// Consumer-side request to start mirroring a remote category into a local
/// category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRemoteRequest {
    pub remote_site_url: String,
    pub remote_category_id: String,
    pub local_category_id: Uuid,
}

/// Result counts from a batch sync pass, surfaced by the admin
/// "sync now" endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub synced: u32,
    pub failed: u32,
    pub revoked: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_payload_wire_shape() {
        let payload = WebhookPayload {
            event: EVENT_POST_PUBLISHED.to_string(),
            post: FederatedPost {
                id: "abc".to_string(),
                title: "Hello".to_string(),
                slug: "hello".to_string(),
                content: String::new(),
                excerpt: None,
                cover_image: None,
                uri: Some("https://blog.example/posts/abc".to_string()),
                author_name: Some("ann".to_string()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            category_id: "cat-1".to_string(),
            site_url: "https://blog.example".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["event"], "post.published");
        assert_eq!(json["categoryId"], "cat-1");
        assert_eq!(json["siteUrl"], "https://blog.example");
        assert_eq!(json["post"]["coverImage"], serde_json::Value::Null);
    }

    #[test]
    fn test_federated_post_tolerates_missing_optionals() {
        let parsed: FederatedPost = serde_json::from_str(
            r#"{
                "id": "1",
                "title": "t",
                "slug": "t",
                "createdAt": "2026-01-01T00:00:00Z",
                "updatedAt": "2026-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert!(parsed.uri.is_none());
        assert!(parsed.content.is_empty());
    }
}
