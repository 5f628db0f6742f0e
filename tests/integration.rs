//! Integration tests: health, register, login, and the token gate on /jokes.
//!
//! Run with `cargo test`. Most tests use the in-memory store. The Postgres test needs
//! `TEST_DATABASE_URL` and is skipped when it is unset.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use gatekeep::auth::TokenIssuer;
use gatekeep::db::{self, MemoryUserStore, PgUserStore, StoreError, StoreResult, User, UserStore};
use gatekeep::{create_app, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;

const SECRET: &str = "integration-test-secret";

fn test_app() -> Router {
    app_with_store(Arc::new(MemoryUserStore::new()))
}

fn app_with_store(store: Arc<dyn UserStore>) -> Router {
    create_app(AppState::new(store, TokenIssuer::new(SECRET)))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn post_raw(
    app: &Router,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        req = req.header("content-type", content_type);
    }
    send(app, req.body(Body::from(body.to_string())).unwrap()).await
}

async fn get_with_auth(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().uri(uri);
    if let Some(token) = token {
        req = req.header("authorization", token);
    }
    send(app, req.body(Body::empty()).unwrap()).await
}

async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let creds = json!({ "username": username, "password": password });
    let (status, _) = post_json(app, "/auth/register", creds.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = post_json(app, "/auth/login", creds).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Store whose every call fails as if the database were unreachable.
struct UnavailableStore;

#[async_trait]
impl UserStore for UnavailableStore {
    async fn find_by_username(&self, _username: &str) -> StoreResult<Option<User>> {
        Err(StoreError::Db(sqlx::Error::PoolClosed))
    }

    async fn find_by_id(&self, _id: i64) -> StoreResult<Option<User>> {
        Err(StoreError::Db(sqlx::Error::PoolClosed))
    }

    async fn insert(&self, _username: &str, _password_hash: &str) -> StoreResult<i64> {
        Err(StoreError::Db(sqlx::Error::PoolClosed))
    }
}

/// Store that loses the pre-check race: the lookup misses but the insert hits the
/// unique constraint.
struct RacingStore;

#[async_trait]
impl UserStore for RacingStore {
    async fn find_by_username(&self, _username: &str) -> StoreResult<Option<User>> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: i64) -> StoreResult<Option<User>> {
        Ok(None)
    }

    async fn insert(&self, _username: &str, _password_hash: &str) -> StoreResult<i64> {
        Err(StoreError::UniqueViolation)
    }
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_app();
    let (status, body) = get_with_auth(&app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_returns_created_user_with_hash() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({ "username": "testuser", "password": "pass123" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_i64());
    assert_eq!(body["username"], "testuser");
    let hash = body["password"].as_str().expect("password should be a string");
    assert_ne!(hash, "pass123");
}

#[tokio::test]
async fn register_missing_fields() {
    let app = test_app();
    for body in [
        json!({ "username": "" }),
        json!({ "password": "pw" }),
        json!({ "username": "u", "password": "" }),
        json!({}),
    ] {
        let (status, res) = post_json(&app, "/auth/register", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res["message"], "username and password required");
    }
}

#[tokio::test]
async fn unreadable_bodies_are_missing_credentials() {
    let app = test_app();
    for uri in ["/auth/register", "/auth/login"] {
        let cases = [
            (None, ""),
            (Some("application/json"), ""),
            (Some("application/json"), "not json"),
            (Some("application/json"), r#"{"username":5,"password":"x"}"#),
            (Some("application/json"), r#"{"username":"u","password":null}"#),
            (Some("text/plain"), r#"{"username":"u","password":"p"}"#),
        ];
        for (content_type, body) in cases {
            let (status, res) = post_raw(&app, uri, content_type, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} {:?}", uri, body);
            assert_eq!(res, json!({ "message": "username and password required" }));
        }
    }
}

#[tokio::test]
async fn register_duplicate_username() {
    let app = test_app();
    let creds = json!({ "username": "duplicate", "password": "pass" });
    let (status, _) = post_json(&app, "/auth/register", creds.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(&app, "/auth/register", creds).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "username taken" }));
}

#[tokio::test]
async fn register_race_lost_at_store_is_username_taken() {
    let app = app_with_store(Arc::new(RacingStore));
    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({ "username": "racer", "password": "pw" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "username taken");
}

#[tokio::test]
async fn login_returns_welcome_and_jwt() {
    let app = test_app();
    let creds = json!({ "username": "tester", "password": "1234" });
    post_json(&app, "/auth/register", creds.clone()).await;

    let (status, body) = post_json(&app, "/auth/login", creds).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "welcome, tester");
    let token = body["token"].as_str().expect("token should be a string");
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn login_missing_fields() {
    let app = test_app();
    let (status, body) = post_json(&app, "/auth/login", json!({ "username": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "username and password required");
}

#[tokio::test]
async fn login_rejections_are_indistinguishable() {
    let app = test_app();
    post_json(
        &app,
        "/auth/register",
        json!({ "username": "tester", "password": "1234" }),
    )
    .await;

    let wrong_password = post_json(
        &app,
        "/auth/login",
        json!({ "username": "tester", "password": "wrongpass" }),
    )
    .await;
    let unknown_user = post_json(
        &app,
        "/auth/login",
        json!({ "username": "nobody", "password": "1234" }),
    )
    .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.1, json!({ "message": "invalid credentials" }));
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn store_failures_are_server_errors() {
    let app = app_with_store(Arc::new(UnavailableStore));
    let creds = json!({ "username": "u", "password": "p" });

    let (status, body) = post_json(&app, "/auth/register", creds.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error registering user");
    assert!(body["error"].is_string());

    let (status, body) = post_json(&app, "/auth/login", creds).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error logging in");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn jokes_require_token() {
    let app = test_app();
    let (status, body) = get_with_auth(&app, "/jokes", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "token required" }));
}

#[tokio::test]
async fn jokes_reject_invalid_token() {
    let app = test_app();
    let (status, body) = get_with_auth(&app, "/jokes", Some("invalid.token.here")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "token invalid" }));
}

#[tokio::test]
async fn jokes_reject_bearer_without_token() {
    let app = test_app();
    let (status, body) = get_with_auth(&app, "/jokes", Some("Bearer ")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "token invalid" }));
}

#[tokio::test]
async fn jokes_reject_token_from_other_secret() {
    let app = test_app();
    let foreign = TokenIssuer::new("someone-else").issue(1, "jokester").unwrap();
    let (status, body) = get_with_auth(&app, "/jokes", Some(foreign.as_str())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "token invalid");
}

#[tokio::test]
async fn jokes_with_valid_token() {
    let app = test_app();
    let token = register_and_login(&app, "jokester", "haha123").await;

    let (status, body) = get_with_auth(&app, "/jokes", Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    let jokes = body.as_array().expect("jokes should be an array");
    assert!(!jokes.is_empty());
    assert!(jokes[0].get("joke").is_some());

    // Same token, same outcome.
    let again = get_with_auth(&app, "/jokes", Some(token.as_str())).await;
    assert_eq!(again, (status, body));
}

#[tokio::test]
async fn routes_are_also_served_under_api() {
    let app = test_app();
    let creds = json!({ "username": "prefixed", "password": "pw" });
    let (status, _) = post_json(&app, "/api/auth/register", creds.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(&app, "/api/auth/login", creds).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, _) = get_with_auth(&app, "/api/jokes", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = get_with_auth(&app, "/api/jokes", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "token required");
}

#[tokio::test]
async fn postgres_register_and_login() {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(u) => u,
        Err(_) => {
            eprintln!("Skip integration test: set TEST_DATABASE_URL");
            return;
        }
    };
    let store = match db::create_pool(&database_url).await {
        Ok(pool) => PgUserStore::new(pool),
        Err(e) => {
            eprintln!("Skip integration test: {}", e);
            return;
        }
    };
    store.migrate().await.unwrap();
    let app = app_with_store(Arc::new(store));

    let username = format!(
        "pg-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis()
    );
    let creds = json!({ "username": username, "password": "password123" });

    let (status, body) = post_json(&app, "/auth/register", creds.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], username.as_str());

    let (status, body) = post_json(&app, "/auth/register", creds.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "username taken");

    let (status, body) = post_json(&app, "/auth/login", creds).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
}
