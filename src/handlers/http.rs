//! Shared state and the health probe.

use std::sync::Arc;

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::auth::{AuthService, TokenIssuer};
use crate::db::UserStore;

/// Shared application state for all routes.
#[derive(Clone)]
pub struct AppState {
    auth_service: AuthService,
    tokens: TokenIssuer,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
        Self {
            auth_service: AuthService::new(store, tokens.clone()),
            tokens,
        }
    }

    pub fn auth_service(&self) -> &AuthService {
        &self.auth_service
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "gatekeep" })),
    )
}
