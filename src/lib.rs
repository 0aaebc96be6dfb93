//! Zlog - Main Library
//!
//! Zlog is a self-hosted blog platform with a federation subsystem that lets
//! independently-operated instances mirror each other's published content by
//! category, across untrusted network boundaries, with eventual consistency
//! and graceful revocation.
//!
//! # Overview
//!
//! This library provides the core functionality for Zlog, including:
//! - Provider-side federation: subscriber registry, authorized read endpoints,
//!   webhook change notifications on publish/update/unpublish/delete
//! - Consumer-side federation: category subscriptions, periodic and reactive
//!   pull-sync into a local mirror, revocation detection
//! - A combined feed that merges locally authored and mirrored remote posts
//!   into one paginated, duplicate-free, chronologically ordered result
//!
//! # Module Structure
//!
//! The library is organized into two main modules:
//!
//! - **`shared`** - Types shared between handlers and the wire
//!   - Entity models and status enums
//!   - Federation wire DTOs (webhook payloads, remote post payloads)
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server with the federation API surface
//!   - Pull-sync worker and webhook dispatcher
//!   - Feed composition over local and mirrored content
//!   - SQLite persistence via sqlx

pub mod backend;
pub mod shared;
