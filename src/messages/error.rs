use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Service-level errors for the messaging system
#[derive(Debug, Error)]
pub enum MessageError {
    /// Recipient account does not exist
    #[error("Recipient not found")]
    RecipientNotFound,

    /// Conversation partner does not exist
    #[error("User not found")]
    UserNotFound,

    /// Users cannot message themselves
    #[error("Cannot send a message to yourself")]
    SelfMessage,

    /// Validation error with details
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Error response body for messaging routes
#[derive(Serialize)]
pub struct MessageErrorBody {
    pub error: String,
    pub message: String,
}

impl IntoResponse for MessageError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            MessageError::RecipientNotFound => (
                StatusCode::NOT_FOUND,
                "RECIPIENT_NOT_FOUND",
                "Recipient not found".to_string(),
            ),
            MessageError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            MessageError::SelfMessage => (
                StatusCode::BAD_REQUEST,
                "SELF_MESSAGE",
                "Cannot send a message to yourself".to_string(),
            ),
            MessageError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            MessageError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(MessageErrorBody {
                error: error_type.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
