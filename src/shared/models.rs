//! Entity models for local content and the federation registries.
//!
//! These structs mirror the rows in the SQLite schema. Status enums are
//! persisted as lowercase strings and parsed back leniently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a locally authored post.
///
/// Only `Published` posts participate in federation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Deleted,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Deleted => "deleted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Lifecycle state of a mirrored remote post.
///
/// `Unreachable` marks posts whose owning subscription was revoked by the
/// provider; the rows are kept so old feed pages stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Published,
    Deleted,
    Unreachable,
}

impl RemoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Deleted => "deleted",
            Self::Unreachable => "unreachable",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "published" => Some(Self::Published),
            "deleted" => Some(Self::Deleted),
            "unreachable" => Some(Self::Unreachable),
            _ => None,
        }
    }
}

/// A category on this instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// A locally authored post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub author_name: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A known remote blog instance, created lazily on first contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteBlog {
    pub id: Uuid,
    /// Canonical origin, stored without a trailing slash.
    pub site_url: String,
    pub display_name: Option<String>,
    pub blog_title: Option<String>,
    pub avatar_url: Option<String>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// A category as advertised by a remote blog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCategory {
    pub id: Uuid,
    pub remote_blog_id: Uuid,
    /// The category's identifier on the remote side. Opaque, never reused
    /// as a local id.
    pub remote_id: String,
    pub name: String,
    pub slug: String,
}

/// Consumer-side link: a local category mirroring a remote category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySubscription {
    pub id: Uuid,
    pub local_category_id: Uuid,
    pub remote_category_id: Uuid,
    pub is_active: bool,
    /// Watermark for incremental pulls; `None` until the first sync.
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Provider-side link: a remote blog following a local category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub category_id: Uuid,
    /// Canonical identity of the watcher, stored trailing-slash-normalized.
    pub subscriber_url: String,
    pub callback_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The mirrored copy of a remote post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: Uuid,
    /// Globally unique `{remote_blog.site_url}/posts/{remote_post_id}`.
    /// The sole idempotency key for sync.
    pub remote_uri: String,
    pub remote_blog_id: Uuid,
    pub remote_category_id: Uuid,
    /// Set from the owning subscription; may be null if no active
    /// subscription maps this remote category.
    pub local_category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub remote_status: RemoteStatus,
    pub author_name: Option<String>,
    pub remote_created_at: DateTime<Utc>,
    pub remote_updated_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_status_round_trip() {
        for status in [PostStatus::Draft, PostStatus::Published, PostStatus::Deleted] {
            assert_eq!(PostStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(PostStatus::from_str("bogus"), None);
    }

    #[test]
    fn test_remote_status_round_trip() {
        for status in [
            RemoteStatus::Published,
            RemoteStatus::Deleted,
            RemoteStatus::Unreachable,
        ] {
            assert_eq!(RemoteStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(RemoteStatus::from_str(""), None);
    }
}
