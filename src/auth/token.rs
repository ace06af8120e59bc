// JWT token issuing and verification

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::{error::AuthError, models::{Role, User}};

/// Token lifetime: 7 days, after which the holder must log in again
pub const TOKEN_TTL_SECS: i64 = 604_800;

/// JWT claims embedded in every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies signed bearer tokens
///
/// Constructed once at startup from the configured secret and shared through
/// application state; never reads configuration at request time.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
}

impl TokenService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Sign a token for an authenticated user
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims
    ///
    /// No expiry leeway: a token is invalid from the exp instant onward.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn test_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string())
    }

    fn test_user(id: i32, username: &str, email: &str, role: Role) -> User {
        User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Test User".to_string(),
            password_hash: "unused".to_string(),
            role,
            headline: None,
            bio: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_expires_in_seven_days() {
        let service = test_service();
        let token = service
            .issue(&test_user(1, "alice", "alice@example.com", Role::User))
            .unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn claims_carry_identity_and_role() {
        let service = test_service();
        let user = test_user(42, "alice", "alice@example.com", Role::Admin);
        let claims = service.verify(&service.issue(&user).unwrap()).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let service = test_service();

        assert!(service.verify("").is_err());
        assert!(service.verify("not.a.token").is_err());
        assert!(service.verify("invalid_token_format").is_err());
        assert!(service
            .verify("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature")
            .is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let service1 = TokenService::new("secret1".to_string());
        let service2 = TokenService::new("secret2".to_string());

        let token = service1
            .issue(&test_user(1, "alice", "alice@example.com", Role::User))
            .unwrap();

        assert!(service1.verify(&token).is_ok());
        assert!(matches!(
            service2.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            iat: now - TOKEN_TTL_SECS - 100,
            exp: now - 100,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            test_service().verify(&token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn token_just_past_expiry_is_rejected() {
        // 30s past exp sits inside the library's default 60s leeway, which
        // verify must not grant
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            iat: now - TOKEN_TTL_SECS,
            exp: now - 30,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            test_service().verify(&token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn token_valid_before_expiry_instant() {
        // iat in the past but exp still ahead: must verify
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Freelancer,
            iat: now - TOKEN_TTL_SECS + 120,
            exp: now + 120,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        assert!(test_service().verify(&token).is_ok());
    }

    proptest! {
        #[test]
        fn prop_issue_verify_roundtrip(
            user_id in 1i32..1000000,
            email in "[a-z]{3,10}@[a-z]{3,10}\\.(com|org|net)",
            username in "[a-z][a-z0-9_]{2,15}"
        ) {
            let service = test_service();
            let user = test_user(user_id, &username, &email, Role::User);
            let claims = service.verify(&service.issue(&user).unwrap()).unwrap();

            prop_assert_eq!(claims.sub, user_id);
            prop_assert_eq!(claims.username, username);
            prop_assert_eq!(claims.email, email);
            prop_assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
        }

        #[test]
        fn prop_random_strings_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            prop_assert!(test_service().verify(&malformed).is_err());
        }
    }
}
