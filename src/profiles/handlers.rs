// HTTP handlers for profile routes
// /api/profile sits behind the authenticated gate; /api/users/:id is public

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::auth::{middleware::AuthenticatedUser, models::Role};
use crate::error::ApiError;
use crate::extract::Json;
use crate::profiles::models::{ApplyRequest, OwnProfile, PublicProfile, UpdateProfileRequest};
use crate::AppState;

const OWN_PROFILE_COLUMNS: &str =
    "id, username, email, full_name, role, headline, bio, created_at";

/// Get the caller's own profile
/// GET /api/profile
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Caller's profile", body = OwnProfile),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn get_own_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<OwnProfile>, ApiError> {
    let profile = sqlx::query_as::<_, OwnProfile>(&format!(
        "SELECT {OWN_PROFILE_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "User".to_string(),
        id: user.id.to_string(),
    })?;

    Ok(Json(profile))
}

/// Update the caller's own profile
/// PUT /api/profile
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = OwnProfile),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn update_own_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<OwnProfile>, ApiError> {
    payload.validate()?;

    tracing::debug!("Updating profile for user {}", user.id);

    // COALESCE keeps current values for fields the request omits
    let profile = sqlx::query_as::<_, OwnProfile>(&format!(
        "UPDATE users \
         SET full_name = COALESCE($2, full_name), \
             headline = COALESCE($3, headline), \
             bio = COALESCE($4, bio) \
         WHERE id = $1 \
         RETURNING {OWN_PROFILE_COLUMNS}"
    ))
    .bind(user.id)
    .bind(payload.full_name)
    .bind(payload.headline)
    .bind(payload.bio)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(profile))
}

/// Submit a freelancer application
/// POST /api/profile/apply
#[utoipa::path(
    post,
    path = "/api/profile/apply",
    request_body = ApplyRequest,
    responses(
        (status = 201, description = "Application submitted"),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already a freelancer or application pending")
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn apply_as_freelancer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    payload.validate()?;

    if user.role == Role::Freelancer || user.role == Role::Admin {
        return Err(ApiError::Conflict {
            message: "Account already has freelancer access".to_string(),
        });
    }

    let has_pending = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS( \
             SELECT 1 FROM freelancer_applications \
             WHERE user_id = $1 AND status = 'PENDING')",
    )
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    if has_pending {
        tracing::warn!("User {} re-submitted a pending application", user.id);
        return Err(ApiError::Conflict {
            message: "An application is already pending review".to_string(),
        });
    }

    let application_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO freelancer_applications (user_id, headline, bio, skills) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(user.id)
    .bind(&payload.headline)
    .bind(&payload.bio)
    .bind(&payload.skills)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("User {} submitted application {}", user.id, application_id);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Application submitted",
            "applicationId": application_id
        })),
    ))
}

/// Get a user's public profile
/// GET /api/users/:id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 404, description = "User not found")
    ),
    tag = "profiles"
)]
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PublicProfile>, ApiError> {
    let profile = sqlx::query_as::<_, PublicProfile>(
        "SELECT id, username, full_name, role, headline, bio, created_at \
         FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(profile))
}
