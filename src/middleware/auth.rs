//! Access gate: every request to a protected route must carry a valid token.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{Claims, TokenIssuer};
use crate::error::AppError;

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware: read the raw token from `Authorization`, verify it, and hand the decoded
/// claims to the downstream handler through request extensions.
///
/// An absent or empty header is `token required`. A `Bearer ` prefix is stripped before
/// verification, so `Bearer <token>` is accepted alongside the raw token; a bare
/// `Bearer ` with nothing after it is `token invalid`.
pub async fn require_token(
    State(tokens): State<TokenIssuer>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| {
            debug!("rejected request: non-ascii authorization header");
            AppError::TokenInvalid
        })?,
        None => {
            debug!("rejected request: missing authorization header");
            return Err(AppError::TokenRequired);
        }
    };
    if header.is_empty() {
        debug!("rejected request: empty authorization header");
        return Err(AppError::TokenRequired);
    }
    let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header);
    if token.is_empty() {
        debug!("rejected request: bearer scheme without token");
        return Err(AppError::TokenInvalid);
    }

    let claims = tokens.verify(token)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Extractor: claims of the caller, set by [`require_token`].
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::TokenRequired)
    }
}
