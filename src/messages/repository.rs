use sqlx::PgPool;

use crate::messages::error::MessageError;
use crate::messages::models::{ConversationSummary, Message};

const MESSAGE_COLUMNS: &str = "id, sender_id, recipient_id, body, is_read, created_at";

/// Repository for database operations on messages
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a user account exists
    pub async fn user_exists(&self, user_id: i32) -> Result<bool, MessageError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Store a new message
    pub async fn send(
        &self,
        sender_id: i32,
        recipient_id: i32,
        body: &str,
    ) -> Result<Message, MessageError> {
        let message = sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages (sender_id, recipient_id, body)
            VALUES ($1, $2, $3)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(sender_id)
        .bind(recipient_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Fetch the full thread between two users, oldest first
    pub async fn thread(&self, user_id: i32, other_id: i32) -> Result<Vec<Message>, MessageError> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at
            "#
        ))
        .bind(user_id)
        .bind(other_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Mark every message from other_id to user_id as read
    ///
    /// Returns the number of messages affected.
    pub async fn mark_read(&self, user_id: i32, other_id: i32) -> Result<u64, MessageError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE recipient_id = $1 AND sender_id = $2 AND NOT is_read
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Count unread messages addressed to a user
    pub async fn unread_count(&self, user_id: i32) -> Result<i64, MessageError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// List the caller's conversations, most recent first
    ///
    /// One row per counterpart, carrying the latest message and the count of
    /// messages the caller has not read yet.
    pub async fn conversations(
        &self,
        user_id: i32,
    ) -> Result<Vec<ConversationSummary>, MessageError> {
        let summaries = sqlx::query_as::<_, ConversationSummary>(
            r#"
            SELECT * FROM (
                SELECT DISTINCT ON (other_id)
                       other_id AS user_id,
                       u.username,
                       m.body AS last_message,
                       m.created_at AS last_message_at,
                       (SELECT COUNT(*) FROM messages
                        WHERE recipient_id = $1 AND sender_id = other_id AND NOT is_read)
                           AS unread_count
                FROM (
                    SELECT *,
                           CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END AS other_id
                    FROM messages
                    WHERE sender_id = $1 OR recipient_id = $1
                ) m
                JOIN users u ON u.id = m.other_id
                ORDER BY other_id, m.created_at DESC
            ) latest
            ORDER BY last_message_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }
}
