// Admin-facing data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Lifecycle of a freelancer application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "application_status")]
pub enum ApplicationStatus {
    #[sqlx(rename = "PENDING")]
    Pending,
    #[sqlx(rename = "APPROVED")]
    Approved,
    #[sqlx(rename = "REJECTED")]
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "PENDING"),
            ApplicationStatus::Approved => write!(f, "APPROVED"),
            ApplicationStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// A freelancer application joined with the applicant's account
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerApplication {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub headline: String,
    pub bio: String,
    pub skills: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<i32>,
}

/// Query filter for the application list
#[derive(Debug, Deserialize)]
pub struct ApplicationListParams {
    pub status: Option<ApplicationStatus>,
}

/// Response for the admin verification endpoint
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminVerifyResponse {
    pub is_admin: bool,
    pub user: AdminVerifyUser,
}

/// Identity echoed back by the verification endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminVerifyUser {
    pub id: i32,
    pub username: String,
    pub email: String,
}
