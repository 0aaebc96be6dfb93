//! Local content: categories and authored posts.
//!
//! Only the lifecycle surface federation needs is exposed here: create,
//! edit, publish, unpublish, delete. Status transitions on a categorized,
//! published post invoke the webhook dispatcher.

/// Database operations for categories and posts
pub mod db;

/// HTTP handlers for the authoring surface
pub mod handlers;
