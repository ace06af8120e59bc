// Database repository for user records

use sqlx::PgPool;

use crate::auth::{error::AuthError, models::User};

const USER_COLUMNS: &str =
    "id, username, email, full_name, password_hash, role, headline, bio, created_at";

/// User repository for credential-store operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with the default USER role
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        full_name: &str,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        let query = format!(
            "INSERT INTO users (username, email, full_name, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(email)
            .bind(full_name)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        // Two unique constraints exist; the constraint name
                        // tells us which field collided.
                        let constraint = db_err.constraint().unwrap_or_default();
                        if constraint.contains("email") {
                            return AuthError::EmailTaken;
                        }
                        return AuthError::UsernameTaken;
                    }
                }
                AuthError::Database(e.to_string())
            })
    }

    /// Find a user by username or email (email match is case-insensitive)
    pub async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, AuthError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE username = $1 OR LOWER(email) = LOWER($1)"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }

    /// Check if a username is taken
    pub async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(exists.0)
    }

    /// Check if an email is registered (case-insensitive)
    pub async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(exists.0)
    }
}
