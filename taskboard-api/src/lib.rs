//! # Taskboard API Server Library
//!
//! HTTP surface of the taskboard backend: user accounts with JWT tokens, and
//! boards that hold tasks that hold subtasks.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON and path extractors that answer with [`error::ApiError`]
//! - `middleware`: Bearer token authentication
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
