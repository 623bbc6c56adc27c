//! # Teahouse
//!
//! Storefront backend for a small tea shop, usable both as a standalone
//! binary and as a library. It covers accounts, credential and
//! identity-provider login, stateless sessions, the two-record profile
//! merge, and admin-gated user administration.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chrono::Duration;
//! use teahouse::auth::SessionKeys;
//! use teahouse::server::{AppState, create_router};
//! use teahouse::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/teahouse.db").unwrap();
//! store.initialize().unwrap();
//!
//! let sessions = SessionKeys::new(b"change-me", Duration::days(30));
//! let state = Arc::new(AppState::new(Arc::new(store), sessions));
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod profile;
pub mod server;
pub mod store;
pub mod types;
