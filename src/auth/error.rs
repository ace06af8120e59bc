// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

use crate::auth::models::Role;

/// Authentication and authorization error types
///
/// Token-verification failures (missing, malformed, expired, bad signature)
/// are distinct variants for logging and tests, but all collapse to the same
/// client-visible 401 body so callers cannot tell which check failed.
#[derive(Debug)]
pub enum AuthError {
    ValidationError(String),
    InvalidCredentials,
    MissingToken,
    InvalidToken,
    ExpiredToken,
    UsernameTaken,
    EmailTaken,
    PasswordHash,
    WeakPassword(String),
    TokenGeneration(String),
    InsufficientRole { required: Role, actual: Role },
    Database(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::UsernameTaken => write!(f, "Username already taken"),
            AuthError::EmailTaken => write!(f, "Email already registered"),
            AuthError::PasswordHash => write!(f, "Password hashing error"),
            AuthError::WeakPassword(msg) => write!(f, "Invalid password: {}", msg),
            AuthError::TokenGeneration(msg) => write!(f, "Token generation error: {}", msg),
            AuthError::InsufficientRole { required, actual } => {
                write!(
                    f,
                    "Insufficient role: required '{}', user has '{}'",
                    required, actual
                )
            }
            AuthError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ValidationError(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::UsernameTaken | AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InsufficientRole { .. } => StatusCode::FORBIDDEN,
            AuthError::PasswordHash
            | AuthError::TokenGeneration(_)
            | AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to clients
    ///
    /// Authentication failures share one message regardless of cause; server
    /// faults surface only a generic line, with detail kept in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::ValidationError(msg) => msg.clone(),
            AuthError::WeakPassword(msg) => msg.clone(),
            AuthError::InvalidCredentials => "Invalid credentials".to_string(),
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::ExpiredToken => {
                "Unauthorized".to_string()
            }
            AuthError::UsernameTaken => "Username already taken".to_string(),
            AuthError::EmailTaken => "Email already registered".to_string(),
            AuthError::InsufficientRole { .. } => "Forbidden".to_string(),
            AuthError::PasswordHash
            | AuthError::TokenGeneration(_)
            | AuthError::Database(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::MissingToken => warn!("Missing token in request"),
            AuthError::InvalidToken => warn!("Invalid token attempt"),
            AuthError::ExpiredToken => warn!("Expired token attempt"),
            AuthError::InvalidCredentials => warn!("Failed login attempt"),
            AuthError::InsufficientRole { required, actual } => {
                warn!(
                    "Authorization failed: required role '{}', user has role '{}'",
                    required, actual
                );
            }
            AuthError::Database(msg) => error!("Database error in auth: {}", msg),
            AuthError::PasswordHash => error!("Password hashing error"),
            AuthError::TokenGeneration(msg) => error!("Token generation error: {}", msg),
            _ => {}
        }

        let body = Json(json!({ "error": self.client_message() }));
        (self.status_code(), body).into_response()
    }
}
