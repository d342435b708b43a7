//! # Taskboard Shared Library
//!
//! Types, storage and authentication logic used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `db`: Connection pool and migrations
//! - `store`: Storage traits with PostgreSQL and in-memory backends
//! - `auth`: Password hashing, JWT tokens and the authenticator

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
