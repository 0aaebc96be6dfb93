//! Backend Module
//!
//! This module contains all server-side code for the Zlog application.
//! It provides an Axum HTTP server exposing the federation API surface,
//! the local authoring endpoints that drive webhook dispatch, and the
//! combined feed.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`federation`** - The federation core: identity registry, subscriber
//!   and subscription registries, webhook dispatcher, pull-sync worker,
//!   revocation handling, inbound federation endpoints
//! - **`posts`** - Local post persistence and lifecycle handlers
//! - **`feed`** - Combined local + remote feed composition
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── federation/     - Federation core
//! ├── posts/          - Local post CRUD and lifecycle
//! ├── feed/           - Feed composer
//! └── error/          - Error types
//! ```
//!
//! # Data Flow
//!
//! A local content change invokes the webhook dispatcher, which notifies
//! each active subscriber out-of-band. On the consumer side, the pull-sync
//! worker reconciles subscribed remote categories into the `remote_posts`
//! mirror, driven by a periodic timer and by the feed's staleness trigger.
//! Webhook delivery is best-effort; pull-sync is the durable fallback.

pub mod error;
pub mod federation;
pub mod feed;
pub mod posts;
pub mod routes;
pub mod server;
