//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the HTTP surface, the persistence layer, and the federation wire formats.
//!
//! # Overview
//!
//! The shared module provides serialization-ready types used on both sides
//! of a federation exchange: the entities this instance persists, and the
//! JSON shapes that travel between instances.

/// Entity models and status enums
pub mod models;

/// Federation wire DTOs
pub mod federation;

pub use federation::{BlogInfo, CategoryInfo, FederatedPost, WebhookPayload};
pub use models::{
    Category, CategorySubscription, Post, PostStatus, RemoteBlog, RemoteCategory, RemotePost,
    RemoteStatus, Subscriber,
};
