//! Federation Module
//!
//! This module contains the federation core: everything needed for this
//! instance to act as a content provider to remote subscribers and as a
//! consumer mirroring remote categories.
//!
//! # Architecture
//!
//! - **`identity`** - Registry of known remote blogs and their advertised
//!   categories, created lazily on first contact
//! - **`subscribers`** - Provider side: which remote blogs follow which
//!   local category, with trailing-slash-insensitive URL identity
//! - **`subscriptions`** - Consumer side: which local category mirrors
//!   which remote category, with the `last_synced_at` watermark
//! - **`mirror`** - The `remote_posts` mirror table, upserted by
//!   `remote_uri` (the sole cross-instance idempotency key)
//! - **`urls`** - Site-URL normalization and relative-to-absolute asset
//!   rewriting
//! - **`webhook`** - Provider side: fire-and-forget change notifications
//! - **`sync`** - Consumer side: pull-sync worker, revocation handling,
//!   stale-sync trigger, periodic timer
//! - **`handlers`** - The inbound `/api/federation/*` HTTP surface
//!
//! # Trust Model
//!
//! Subscriber identity is a self-declared URL carried in the
//! `X-Zlog-Subscriber-Url` header and matched against the subscriber
//! registry. It is advisory, not a cryptographic credential; it exists so
//! a provider can recognize a subscriber it has revoked and answer with
//! the distinguished `ERR_SUBSCRIPTION_REVOKED` code.

pub mod handlers;
pub mod identity;
pub mod mirror;
pub mod subscribers;
pub mod subscriptions;
pub mod sync;
pub mod urls;
pub mod webhook;
