//! Auth HTTP handlers: register, login.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::auth::{Credentials, LoginResponse};
use crate::db::User;
use crate::error::{AppError, AppResult};
use crate::handlers::http::AppState;

/// A body that is absent, not JSON, or has non-string fields counts as missing credentials.
fn credentials(body: Result<Json<Credentials>, JsonRejection>) -> AppResult<Credentials> {
    body.map(|Json(c)| c).map_err(|e| {
        debug!(error = %e, "rejected credentials body");
        AppError::MissingCredentials
    })
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.auth_service().register(credentials(body)?).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let res = state.auth_service().login(credentials(body)?).await?;
    Ok(Json(res))
}
