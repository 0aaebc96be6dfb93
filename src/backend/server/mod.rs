//! Server Module
//!
//! This module contains all server-side code for initializing and
//! configuring the Axum HTTP server.
//!
//! # Architecture
//!
//! The server module is organized into focused submodules:
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Site configuration and database loading
//! - **`init`** - Server initialization and app creation
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: Reads site identity and sync settings from
//!    the environment
//! 2. **Database**: Connects the SQLite pool and runs migrations
//! 3. **State Creation**: Builds `AppState` with the pool, the shared HTTP
//!    client, and the stale-sync trigger guard
//! 4. **Background Tasks**: Starts the periodic pull-sync timer
//! 5. **Router Creation**: Configures all routes

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::SiteConfig;
pub use init::create_app;
pub use state::AppState;
