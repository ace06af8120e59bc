// Authentication service - business logic layer

use tracing::info;

use crate::auth::{
    error::AuthError,
    models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse},
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};

/// Authentication service coordinating credential checks and token issuing
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: UserRepository, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Register a new user and log them in
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        PasswordService::validate_password_strength(&request.password)?;

        if self.users.username_exists(&request.username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.email_exists(&request.email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = PasswordService::hash_password(&request.password)?;
        let user = self
            .users
            .create_user(
                &request.username,
                &request.email,
                &request.full_name,
                &password_hash,
            )
            .await?;

        info!("Registered user id={} username={}", user.id, user.username);

        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse {
            message: "Registration successful".to_string(),
            user: user.into(),
            token,
        })
    }

    /// Authenticate credentials and issue a token
    ///
    /// Unknown identity and wrong password produce the same error so the
    /// response cannot be used to enumerate accounts.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = self
            .users
            .find_by_username_or_email(&request.username_or_email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        info!("User id={} logged in", user.id);

        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse {
            message: "Login successful".to_string(),
            user: user.into(),
            token,
        })
    }

    /// Load the current user for a verified session
    ///
    /// A token referencing a deleted account is treated like any other
    /// invalid token.
    pub async fn current_user(&self, user_id: i32) -> Result<UserResponse, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        Ok(user.into())
    }
}
