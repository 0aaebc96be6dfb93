//! Combined feed over local and mirrored remote content.
//!
//! The composer merges published local posts and published, locally-mapped
//! remote posts into one paginated, duplicate-free, chronologically
//! ordered result. Serving a page that contains remote rows
//! opportunistically triggers a stale-sync pass, detached from the
//! request.

/// Two-pass merge/paginate/hydrate logic
pub mod composer;

/// HTTP handler for the combined feed
pub mod handlers;
