/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `account`: Authenticated account updates

pub mod account;
pub mod auth;
pub mod health;
