//! Middleware: token gate for protected routes.

pub mod auth;

pub use auth::{require_token, AuthUser};
