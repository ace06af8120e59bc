// Route-level tests exercising the full router and its access gates
//
// The pool is lazy, so only routes that never touch the database are
// exercised here; gate rejections and the admin verify endpoint short-circuit
// before any query runs.

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;

use crate::auth::models::{Role, User};
use crate::auth::token::{Claims, TokenService, TOKEN_TTL_SECS};
use crate::{create_router, AppState};

const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";

fn test_server() -> TestServer {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/marketplace_test")
        .unwrap();
    let state = AppState::new(pool, TEST_SECRET);
    TestServer::new(create_router(state)).unwrap()
}

fn token_for(role: Role) -> String {
    let user = User {
        id: 7,
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        full_name: "Alice".to_string(),
        password_hash: "unused".to_string(),
        role,
        headline: None,
        bio: None,
        created_at: Utc::now(),
    };
    TokenService::new(TEST_SECRET.to_string()).issue(&user).unwrap()
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

#[tokio::test]
async fn admin_routes_reject_anonymous_with_generic_body() {
    let server = test_server();
    let response = server.get("/api/admin/verify").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<serde_json::Value>(),
        serde_json::json!({"error": "Unauthorized"})
    );
}

#[tokio::test]
async fn admin_routes_reject_user_role() {
    let server = test_server();
    let (name, value) = bearer(&token_for(Role::User));
    let response = server.get("/api/admin/verify").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.json::<serde_json::Value>(),
        serde_json::json!({"error": "Forbidden"})
    );
}

#[tokio::test]
async fn admin_verify_confirms_admin_identity() {
    let server = test_server();
    let (name, value) = bearer(&token_for(Role::Admin));
    let response = server.get("/api/admin/verify").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<serde_json::Value>(),
        serde_json::json!({
            "isAdmin": true,
            "user": {
                "id": 7,
                "username": "alice",
                "email": "alice@example.com"
            }
        })
    );
}

#[tokio::test]
async fn expired_token_gets_the_same_generic_401() {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: 7,
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        role: Role::Admin,
        iat: now - TOKEN_TTL_SECS - 60,
        exp: now - 60,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let server = test_server();
    let (name, value) = bearer(&token);
    let response = server.get("/api/admin/verify").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<serde_json::Value>(),
        serde_json::json!({"error": "Unauthorized"})
    );
}

#[tokio::test]
async fn freelancer_routes_reject_plain_users() {
    let server = test_server();
    let (name, value) = bearer(&token_for(Role::User));
    let response = server
        .post("/api/my/services")
        .add_header(name, value)
        .json(&serde_json::json!({
            "title": "Logo design",
            "description": "A professional logo for your brand",
            "category": "design",
            "priceCents": 5000
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn message_routes_require_authentication() {
    let server = test_server();

    let response = server.get("/api/messages/unread").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/messages")
        .json(&serde_json::json!({"recipientId": 2, "body": "hi"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_routes_require_authentication() {
    let server = test_server();
    let response = server.get("/api/profile").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<serde_json::Value>(),
        serde_json::json!({"error": "Unauthorized"})
    );
}

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let server = test_server();
    let response = server.get("/api/auth/me").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<serde_json::Value>(),
        serde_json::json!({"error": "Unauthorized"})
    );
}

#[tokio::test]
async fn login_with_missing_fields_is_rejected_before_any_lookup() {
    let server = test_server();
    let response = server
        .post("/api/auth/login")
        .json(&serde_json::json!({"usernameOrEmail": "alice"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error_code"], "BAD_REQUEST");
}

#[tokio::test]
async fn register_with_non_json_body_gets_400() {
    let server = test_server();
    let response = server
        .post("/api/auth/register")
        .add_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )
        .text("not json at all")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gate_rejection_is_stable_across_repeated_requests() {
    let server = test_server();
    let token = token_for(Role::User);

    for _ in 0..2 {
        let (name, value) = bearer(&token);
        let response = server.get("/api/admin/verify").add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }
}
