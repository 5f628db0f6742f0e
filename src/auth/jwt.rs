//! JWT issue and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Tokens expire one day after issuance.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub subject: i64, // user id
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a single HS256 secret fixed at startup.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, subject: i64, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(subject, username, Utc::now())
    }

    /// Issue a token as if signed at `now`. Expiry is `now + TOKEN_TTL_HOURS`.
    pub fn issue_at(
        &self,
        subject: i64,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            subject,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify signature and expiry. Empty input is `TokenRequired`; anything else that
    /// fails to decode is `TokenInvalid`.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        if token.is_empty() {
            return Err(AppError::TokenRequired);
        }
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(error = %e, "token rejected");
            AppError::TokenInvalid
        })?;
        Ok(data.claims)
    }
}
