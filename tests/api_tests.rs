use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use booktalk::app::build_app;
use booktalk::config::{AppConfig, JwtConfig};
use booktalk::state::AppState;
use booktalk::store::InMemoryUserStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app(ttl_hours: i64) -> (Router, Arc<InMemoryUserStore>) {
    let store = Arc::new(InMemoryUserStore::new());
    let config = Arc::new(AppConfig {
        database_url: "postgres://localhost:5432/booktalk_test".into(),
        jwt: JwtConfig {
            secret: "test-secret".into(),
            ttl_hours,
        },
    });
    let state = AppState::from_parts(store.clone(), config);
    (build_app(state), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should not fail at the transport level");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn alice() -> Value {
    json!({
        "username": "alice123",
        "email": "alice@example.com",
        "password": "secret123",
        "firstName": "Alice",
        "lastName": "Reader"
    })
}

async fn register_alice(app: &Router) -> (String, Value) {
    let (status, body) = send(app, post_json("/auth/register", &alice())).await;
    assert_eq!(status, StatusCode::CREATED);
    (body["token"].as_str().expect("token").to_string(), body)
}

#[tokio::test]
async fn health_is_open() {
    let (app, _) = test_app(1);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_returns_token_and_public_user() {
    let (app, _) = test_app(1);
    let (status, body) = send(&app, post_json("/auth/register", &alice())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], "alice123");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"]["id"].is_string());
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn register_rejects_missing_fields_and_bad_email() {
    let (app, _) = test_app(1);

    let mut incomplete = alice();
    incomplete["lastName"] = json!("");
    let (status, _) = send(&app, post_json("/auth/register", &incomplete)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_email = alice();
    bad_email["email"] = json!("not-an-email");
    let (status, body) = send(&app, post_json("/auth/register", &bad_email)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email");
}

#[tokio::test]
async fn duplicate_email_and_username_both_conflict() {
    let (app, _) = test_app(1);
    register_alice(&app).await;

    let mut same_email = alice();
    same_email["username"] = json!("bob456");
    let (status, body) = send(&app, post_json("/auth/register", &same_email)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    // Combined message: the response must not say which field collided.
    assert_eq!(body["message"], "Email or username already in use");

    let mut same_username = alice();
    same_username["email"] = json!("bob@example.com");
    let (status, body) = send(&app, post_json("/auth/register", &same_username)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email or username already in use");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (app, _) = test_app(1);
    register_alice(&app).await;

    let (unknown_status, unknown_body) = send(
        &app,
        post_json(
            "/auth/login",
            &json!({"email": "nobody@example.com", "password": "secret123"}),
        ),
    )
    .await;
    let (wrong_status, wrong_body) = send(
        &app,
        post_json(
            "/auth/login",
            &json!({"email": "alice@example.com", "password": "wrong-password"}),
        ),
    )
    .await;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body["message"], wrong_body["message"]);
}

#[tokio::test]
async fn login_then_me_via_either_header() {
    let (app, _) = test_app(1);
    register_alice(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            "/auth/login",
            &json!({"email": "alice@example.com", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token");

    // Dedicated header.
    let request = Request::builder()
        .uri("/auth/me")
        .header("x-auth-token", token)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice123");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    // Standard Bearer header.
    let request = Request::builder()
        .uri("/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice123");
}

#[tokio::test]
async fn dedicated_header_takes_precedence() {
    let (app, _) = test_app(1);
    let (token, _) = register_alice(&app).await;

    let request = Request::builder()
        .uri("/auth/me")
        .header("x-auth-token", token)
        .header(header::AUTHORIZATION, "Bearer garbage")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_and_garbage_tokens_are_unauthorized_not_500() {
    let (app, _) = test_app(1);
    register_alice(&app).await;

    let request = Request::builder().uri("/auth/me").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/auth/me")
        .header("x-auth-token", "garbage")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A malformed Authorization scheme counts as no token at all.
    let request = Request::builder()
        .uri("/auth/me")
        .header(header::AUTHORIZATION, "garbage")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    // Tokens from this app are already expired at issuance.
    let (app, _) = test_app(-1);
    let (token, _) = register_alice(&app).await;

    let request = Request::builder()
        .uri("/auth/me")
        .header("x-auth-token", token)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is not valid");
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let (app, store) = test_app(1);
    let (token, body) = register_alice(&app).await;
    let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
    store.remove(id).expect("user existed");

    let request = Request::builder()
        .uri("/auth/me")
        .header("x-auth-token", token)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    // Same outcome as a bad signature.
    assert_eq!(body["message"], "Token is not valid");
}

#[tokio::test]
async fn owner_can_update_profile_others_cannot() {
    let (app, _) = test_app(1);
    let (token, body) = register_alice(&app).await;
    let id = body["user"]["id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/users/{id}"))
        .header("x-auth-token", &token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&json!({"bio": "reads too much", "firstName": "Alicia"})).unwrap(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "reads too much");
    assert_eq!(body["firstName"], "Alicia");
    assert!(body.get("password").is_none());

    // Same token, someone else's id.
    let other = uuid::Uuid::new_v4();
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/users/{other}"))
        .header("x-auth-token", &token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"bio": "hijack"})).unwrap()))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn username_change_respects_uniqueness() {
    let (app, _) = test_app(1);
    let (token, body) = register_alice(&app).await;
    let id = body["user"]["id"].as_str().unwrap().to_string();

    let mut bob = alice();
    bob["username"] = json!("bob456");
    bob["email"] = json!("bob@example.com");
    let (status, _) = send(&app, post_json("/auth/register", &bob)).await;
    assert_eq!(status, StatusCode::CREATED);

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/users/{id}"))
        .header("x-auth-token", &token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&json!({"username": "bob456"})).unwrap(),
        ))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
