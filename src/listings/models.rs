// Service listing data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A service offered by a freelancer
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i32,
    pub freelancer_id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Price in cents to avoid floating-point money
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new service listing
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    #[validate(length(min = 3, max = 120, message = "Title must be 3-120 characters"))]
    pub title: String,

    #[validate(length(min = 10, max = 5000, message = "Description must be 10-5000 characters"))]
    pub description: String,

    #[validate(custom = "crate::validation::validate_category")]
    pub category: String,

    #[validate(custom = "crate::validation::validate_positive_price")]
    pub price_cents: i64,
}

/// Request to update an existing service; all fields optional
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    #[validate(length(min = 3, max = 120, message = "Title must be 3-120 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 10, max = 5000, message = "Description must be 10-5000 characters"))]
    pub description: Option<String>,

    #[validate(custom = "crate::validation::validate_category")]
    pub category: Option<String>,

    #[validate(custom = "crate::validation::validate_positive_price")]
    pub price_cents: Option<i64>,
}
