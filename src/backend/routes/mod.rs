//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs                - Module exports and documentation
//! ├── router.rs             - Main router creation
//! ├── api_routes.rs         - Local authoring and feed endpoints
//! └── federation_routes.rs  - Provider and consumer federation endpoints
//! ```
//!
//! # Route Types
//!
//! ## API Routes
//!
//! - `POST /api/categories` - Create a category
//! - `POST /api/posts` - Create a draft post
//! - `PUT /api/posts/{id}` - Edit a post
//! - `POST /api/posts/{id}/publish` - Publish a post
//! - `POST /api/posts/{id}/unpublish` - Withdraw a post to draft
//! - `DELETE /api/posts/{id}` - Soft-delete a post
//! - `GET /api/feed` - Combined local + remote feed
//!
//! ## Federation Routes (provider side)
//!
//! - `GET /api/federation/info` - Blog identity
//! - `GET /api/federation/categories` - Public categories
//! - `GET /api/federation/categories/{id}/posts` - Published posts
//! - `GET /api/federation/posts/{id}` - Single published post
//! - `POST /api/federation/subscribe` - Register a subscriber
//! - `POST /api/federation/unsubscribe` - Deregister a subscriber
//!
//! ## Federation Routes (consumer side)
//!
//! - `POST /api/federation/webhook` - Inbound change notifications
//! - `POST /api/federation/subscriptions` - Subscribe to a remote category
//! - `DELETE /api/federation/subscriptions/{id}` - Cancel a subscription
//! - `POST /api/federation/sync` - Sync all subscriptions now

/// Main router creation
pub mod router;

/// Local authoring and feed endpoints
pub mod api_routes;

/// Federation endpoints, both provider and consumer side
pub mod federation_routes;

// Re-export commonly used functions
pub use router::create_router;
