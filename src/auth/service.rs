//! Auth service: registration, login, password hashing.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::auth::TokenIssuer;
use crate::db::{User, UserStore};
use crate::error::{AppError, AppResult, LOGIN_FAILED, REGISTER_FAILED};

/// Body of `POST /auth/register` and `POST /auth/login`. Fields are optional so that a
/// missing key is reported as a validation failure rather than a parse error.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub username: Option<String>,
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn into_parts(self) -> AppResult<(String, String)> {
        self.validate().map_err(|_| AppError::MissingCredentials)?;
        match (self.username, self.password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(AppError::MissingCredentials),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Create an account and return the stored record, hash included.
    pub async fn register(&self, credentials: Credentials) -> AppResult<User> {
        let (username, password) = credentials.into_parts()?;

        let existing = self
            .store
            .find_by_username(&username)
            .await
            .map_err(|e| AppError::from_store(REGISTER_FAILED, e))?;
        if existing.is_some() {
            return Err(AppError::UsernameTaken);
        }

        let hash =
            hash_password(&password).map_err(|e| AppError::internal(REGISTER_FAILED, e))?;
        // A concurrent registration can pass the check above; the store's unique
        // constraint then rejects this insert and it maps to UsernameTaken.
        let id = self
            .store
            .insert(&username, &hash)
            .await
            .map_err(|e| AppError::from_store(REGISTER_FAILED, e))?;

        let user = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| AppError::from_store(REGISTER_FAILED, e))?
            .ok_or_else(|| {
                AppError::internal(REGISTER_FAILED, format!("user {} not found after insert", id))
            })?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check credentials and issue a token. Unknown usernames and wrong passwords
    /// produce the same error.
    pub async fn login(&self, credentials: Credentials) -> AppResult<LoginResponse> {
        let (username, password) = credentials.into_parts()?;

        let user = self
            .store
            .find_by_username(&username)
            .await
            .map_err(|e| AppError::internal(LOGIN_FAILED, e))?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&password, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(user.id, &user.username)
            .map_err(|e| AppError::internal(LOGIN_FAILED, e))?;

        info!(user_id = user.id, username = %user.username, "user logged in");
        Ok(LoginResponse {
            message: format!("welcome, {}", user.username),
            token,
        })
    }
}

/// Salted argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

/// False for a wrong password and for a stored hash that does not parse.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
