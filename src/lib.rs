//! Token-based authentication gateway built with Rust.
//!
//! Registers users with argon2-hashed passwords, issues HS256 bearer tokens on
//! login, and gates protected routes behind token verification.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the API router (auth, jokes, health). Used by main and by integration tests.
///
/// The auth and jokes routes are served both at the root and under `/api`.
pub fn create_app(state: AppState) -> axum::Router {
    let api = api_routes(&state);

    axum::Router::new()
        .route("/health", get(http::health))
        .merge(api.clone())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: &AppState) -> axum::Router<AppState> {
    let auth_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let protected = axum::Router::new()
        .route("/jokes", get(handlers::list_jokes))
        .route_layer(axum::middleware::from_fn_with_state(
            state.tokens().clone(),
            middleware::require_token,
        ));

    axum::Router::new()
        .nest("/auth", auth_routes)
        .merge(protected)
}
