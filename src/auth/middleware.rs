// Session resolution and role-gating middleware for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{
    error::AuthError,
    models::Role,
    token::{Claims, TokenService},
};

/// Resolve the bearer token on a request into verified claims
///
/// This is the single session-resolution point: both the extractor and the
/// role gate go through it. Every failure mode maps to a 401 variant that
/// renders the same generic body.
pub fn resolve_claims(tokens: &TokenService, headers: &HeaderMap) -> Result<Claims, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?;

    tokens.verify(token)
}

/// Verified identity attached to a request for the duration of its handling
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);
        let claims = resolve_claims(&tokens, &parts.headers)?;
        Ok(claims.into())
    }
}

/// Access gate composing session resolution with a role predicate
///
/// Wrapped around routes via `axum::middleware::from_fn` at registration
/// time; it is the only place role checks happen. `required: None` accepts
/// any authenticated user; `Some(role)` requires exact equality.
#[derive(Clone)]
pub struct RequireRole {
    tokens: TokenService,
    required: Option<Role>,
}

impl RequireRole {
    pub fn new(tokens: TokenService, required: Option<Role>) -> Self {
        Self { tokens, required }
    }

    /// Gate requiring the Admin role
    pub fn admin(tokens: TokenService) -> Self {
        Self::new(tokens, Some(Role::Admin))
    }

    /// Gate requiring the Freelancer role
    pub fn freelancer(tokens: TokenService) -> Self {
        Self::new(tokens, Some(Role::Freelancer))
    }

    /// Gate accepting any authenticated role
    pub fn authenticated(tokens: TokenService) -> Self {
        Self::new(tokens, None)
    }

    /// Middleware entry point: resolve session, check role, then run the
    /// wrapped handler. Short-circuits with 401/403 and touches no state on
    /// failure.
    pub async fn handle(self, request: Request, next: Next) -> Result<Response, AuthError> {
        let endpoint = request.uri().path().to_string();

        let claims = resolve_claims(&self.tokens, request.headers()).map_err(|e| {
            warn!("Rejected unauthenticated request to {}: {}", endpoint, e);
            e
        })?;

        if let Some(required) = self.required {
            if claims.role != required {
                return Err(AuthError::InsufficientRole {
                    required,
                    actual: claims.role,
                });
            }
        }

        debug!(
            "Authorized user_id={} role={} for {}",
            claims.sub, claims.role, endpoint
        );
        Ok(next.run(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::User;
    use axum::http::{HeaderName, HeaderValue, Request as HttpRequest, StatusCode};
    use axum::{middleware, routing::get, Router};
    use axum_test::TestServer;
    use chrono::Utc;

    fn test_tokens() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string())
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
        test_tokens().issue(&user).unwrap()
    }

    fn parts_with_auth(value: &str) -> Parts {
        let req = HttpRequest::builder()
            .uri("/")
            .header(header::AUTHORIZATION, value)
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();
        parts
    }

    fn gated_server(gate: RequireRole) -> TestServer {
        let app = Router::new()
            .route("/guarded", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(move |req: Request, next: Next| {
                let gate = gate.clone();
                async move { gate.handle(req, next).await }
            }));
        TestServer::new(app).unwrap()
    }

    fn bearer(token: &str) -> (HeaderName, HeaderValue) {
        (
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        )
    }

    #[tokio::test]
    async fn extractor_accepts_valid_token() {
        let token = token_for(Role::User);
        let mut parts = parts_with_auth(&format!("Bearer {}", token));

        let user = AuthenticatedUser::from_request_parts(&mut parts, &test_tokens())
            .await
            .unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn extractor_rejects_missing_header() {
        let req = HttpRequest::builder().uri("/").body(()).unwrap();
        let (mut parts, _) = req.into_parts();

        let result = AuthenticatedUser::from_request_parts(&mut parts, &test_tokens()).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn extractor_rejects_non_bearer_schemes() {
        for value in ["Basic dXNlcjpwYXNz", "token_without_bearer", "Bearer"] {
            let mut parts = parts_with_auth(value);
            let result = AuthenticatedUser::from_request_parts(&mut parts, &test_tokens()).await;
            assert!(result.is_err(), "scheme {:?} should be rejected", value);
        }
    }

    #[tokio::test]
    async fn admin_gate_rejects_anonymous_with_generic_body() {
        let server = gated_server(RequireRole::admin(test_tokens()));
        let response = server.get("/guarded").await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<serde_json::Value>(),
            serde_json::json!({"error": "Unauthorized"})
        );
    }

    #[tokio::test]
    async fn admin_gate_rejects_user_role_with_403() {
        let server = gated_server(RequireRole::admin(test_tokens()));
        let (name, value) = bearer(&token_for(Role::User));
        let response = server.get("/guarded").add_header(name, value).await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.json::<serde_json::Value>(),
            serde_json::json!({"error": "Forbidden"})
        );
    }

    #[tokio::test]
    async fn admin_gate_passes_admin_through_to_handler() {
        let server = gated_server(RequireRole::admin(test_tokens()));
        let (name, value) = bearer(&token_for(Role::Admin));
        let response = server.get("/guarded").add_header(name, value).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn freelancer_gate_uses_exact_equality() {
        let server = gated_server(RequireRole::freelancer(test_tokens()));

        let (name, value) = bearer(&token_for(Role::Admin));
        let response = server.get("/guarded").add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        let (name, value) = bearer(&token_for(Role::Freelancer));
        let response = server.get("/guarded").add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn authenticated_gate_accepts_any_role() {
        let server = gated_server(RequireRole::authenticated(test_tokens()));

        for role in [Role::User, Role::Freelancer, Role::Admin] {
            let (name, value) = bearer(&token_for(role));
            let response = server.get("/guarded").add_header(name, value).await;
            assert_eq!(response.status_code(), StatusCode::OK);
        }

        let response = server.get("/guarded").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn gate_outcome_is_stable_across_repeated_requests() {
        let server = gated_server(RequireRole::admin(test_tokens()));
        let token = token_for(Role::User);

        for _ in 0..2 {
            let (name, value) = bearer(&token);
            let response = server.get("/guarded").add_header(name, value).await;
            assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        }
    }
}
