//! # Passgate Shared Library
//!
//! This crate contains the credential-management core used by the Passgate
//! API server: password hashing, token issuance, the user store abstraction
//! and the authentication service that ties them together.
//!
//! ## Module Organization
//!
//! - `auth`: Credential codec (Argon2id) and JWT token issuer
//! - `models`: User record, identity and profile types
//! - `store`: `UserStore` trait with PostgreSQL and in-memory implementations
//! - `db`: Connection pool and embedded migrations
//! - `service`: Registration, login and account update orchestration

pub mod auth;
pub mod db;
pub mod models;
pub mod service;
pub mod store;

/// Current version of the Passgate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
