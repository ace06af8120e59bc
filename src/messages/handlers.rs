// HTTP handlers for messaging routes
// All routes sit behind the authenticated gate

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::extract::Json;
use crate::messages::error::MessageError;
use crate::messages::models::{
    ConversationSummary, Message, SendMessageRequest, UnreadCount,
};
use crate::messages::repository::MessageRepository;
use crate::AppState;

/// Send a direct message to another user
/// POST /api/messages
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipient not found")
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), MessageError> {
    payload
        .validate()
        .map_err(|e| MessageError::ValidationError(e.to_string()))?;

    if payload.recipient_id == user.id {
        return Err(MessageError::SelfMessage);
    }

    let repo = MessageRepository::new(state.db.clone());

    if !repo.user_exists(payload.recipient_id).await? {
        return Err(MessageError::RecipientNotFound);
    }

    let message = repo.send(user.id, payload.recipient_id, &payload.body).await?;

    tracing::debug!(
        "User {} sent message {} to user {}",
        user.id,
        message.id,
        payload.recipient_id
    );
    Ok((StatusCode::CREATED, Json(message)))
}

/// List the caller's conversations
/// GET /api/messages/conversations
#[utoipa::path(
    get,
    path = "/api/messages/conversations",
    responses(
        (status = 200, description = "Conversation list", body = Vec<ConversationSummary>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ConversationSummary>>, MessageError> {
    let repo = MessageRepository::new(state.db.clone());
    let summaries = repo.conversations(user.id).await?;
    Ok(Json(summaries))
}

/// Fetch the message thread with another user, oldest first
/// GET /api/messages/with/:user_id
#[utoipa::path(
    get,
    path = "/api/messages/with/{user_id}",
    params(
        ("user_id" = i32, Path, description = "The other participant's user ID")
    ),
    responses(
        (status = 200, description = "Message thread", body = Vec<Message>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn get_thread(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(other_id): Path<i32>,
) -> Result<Json<Vec<Message>>, MessageError> {
    let repo = MessageRepository::new(state.db.clone());

    if !repo.user_exists(other_id).await? {
        return Err(MessageError::UserNotFound);
    }

    let messages = repo.thread(user.id, other_id).await?;
    Ok(Json(messages))
}

/// Mark every message from another user as read
/// PUT /api/messages/with/:user_id/read
#[utoipa::path(
    put,
    path = "/api/messages/with/{user_id}/read",
    params(
        ("user_id" = i32, Path, description = "The other participant's user ID")
    ),
    responses(
        (status = 200, description = "Messages marked as read"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn mark_thread_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(other_id): Path<i32>,
) -> Result<Json<serde_json::Value>, MessageError> {
    let repo = MessageRepository::new(state.db.clone());

    if !repo.user_exists(other_id).await? {
        return Err(MessageError::UserNotFound);
    }

    let updated = repo.mark_read(user.id, other_id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}

/// Count the caller's unread messages
/// GET /api/messages/unread
#[utoipa::path(
    get,
    path = "/api/messages/unread",
    responses(
        (status = 200, description = "Unread message count", body = UnreadCount),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UnreadCount>, MessageError> {
    let repo = MessageRepository::new(state.db.clone());
    let count = repo.unread_count(user.id).await?;
    Ok(Json(UnreadCount { count }))
}
