// Profile data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::models::Role;

/// The caller's own profile, including private fields
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user's profile as other users see it; no email, no role internals
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 120, message = "Headline must be at most 120 characters"))]
    pub headline: Option<String>,

    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,
}

/// Freelancer application request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[validate(length(min = 3, max = 120, message = "Headline must be 3-120 characters"))]
    pub headline: String,

    #[validate(length(min = 10, max = 2000, message = "Bio must be 10-2000 characters"))]
    pub bio: String,

    #[validate(length(min = 1, max = 500, message = "Skills must be 1-500 characters"))]
    pub skills: String,
}
