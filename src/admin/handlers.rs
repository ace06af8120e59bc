// HTTP handlers for admin-only routes
// All routes in this module sit behind the admin gate

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::admin::models::{
    AdminVerifyResponse, AdminVerifyUser, ApplicationListParams, ApplicationStatus,
    FreelancerApplication,
};
use crate::auth::{middleware::AuthenticatedUser, models::Role};
use crate::error::ApiError;
use crate::AppState;

const APPLICATION_COLUMNS: &str = "a.id, a.user_id, u.username, u.email, a.headline, a.bio, \
     a.skills, a.status, a.submitted_at, a.reviewed_at, a.reviewed_by";

/// Confirm that the caller holds the admin role
/// GET /api/admin/verify
///
/// The gate has already rejected non-admins by the time this runs, so the
/// body always reports true for the authenticated caller.
#[utoipa::path(
    get,
    path = "/api/admin/verify",
    responses(
        (status = 200, description = "Caller is an admin", body = AdminVerifyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn verify_admin(user: AuthenticatedUser) -> Json<AdminVerifyResponse> {
    Json(AdminVerifyResponse {
        is_admin: user.role == Role::Admin,
        user: AdminVerifyUser {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    })
}

/// List freelancer applications, optionally filtered by status
/// GET /api/admin/applications
#[utoipa::path(
    get,
    path = "/api/admin/applications",
    params(
        ("status" = Option<String>, Query, description = "Filter by application status")
    ),
    responses(
        (status = 200, description = "List of applications", body = Vec<FreelancerApplication>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(params): Query<ApplicationListParams>,
) -> Result<Json<Vec<FreelancerApplication>>, ApiError> {
    tracing::debug!("Listing freelancer applications, filter: {:?}", params.status);

    let applications = match params.status {
        Some(status) => {
            sqlx::query_as::<_, FreelancerApplication>(&format!(
                "SELECT {APPLICATION_COLUMNS} \
                 FROM freelancer_applications a \
                 JOIN users u ON u.id = a.user_id \
                 WHERE a.status = $1 \
                 ORDER BY a.submitted_at"
            ))
            .bind(status)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, FreelancerApplication>(&format!(
                "SELECT {APPLICATION_COLUMNS} \
                 FROM freelancer_applications a \
                 JOIN users u ON u.id = a.user_id \
                 ORDER BY a.submitted_at"
            ))
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(applications))
}

/// Approve a pending freelancer application
/// POST /api/admin/applications/:id/approve
///
/// Approval flips the applicant's role to FREELANCER in the same
/// transaction, so the two writes either both land or neither does.
#[utoipa::path(
    post,
    path = "/api/admin/applications/{id}/approve",
    params(
        ("id" = i32, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application approved", body = FreelancerApplication),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application already reviewed")
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn approve_application(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<FreelancerApplication>, ApiError> {
    tracing::debug!("Admin {} approving application {}", admin.id, id);

    let mut tx = state.db.begin().await?;

    let pending = fetch_pending_for_review(&mut tx, id).await?;

    let reviewed = sqlx::query_as::<_, FreelancerApplication>(&format!(
        "WITH updated AS ( \
             UPDATE freelancer_applications \
             SET status = 'APPROVED', reviewed_at = NOW(), reviewed_by = $2 \
             WHERE id = $1 \
             RETURNING * \
         ) \
         SELECT {APPLICATION_COLUMNS} \
         FROM updated a JOIN users u ON u.id = a.user_id"
    ))
    .bind(id)
    .bind(admin.id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET role = 'FREELANCER' WHERE id = $1")
        .bind(pending.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        "Application {} approved; user {} is now a freelancer",
        id,
        pending.user_id
    );
    Ok(Json(reviewed))
}

/// Reject a pending freelancer application
/// POST /api/admin/applications/:id/reject
#[utoipa::path(
    post,
    path = "/api/admin/applications/{id}/reject",
    params(
        ("id" = i32, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application rejected", body = FreelancerApplication),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application already reviewed")
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn reject_application(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<FreelancerApplication>, ApiError> {
    tracing::debug!("Admin {} rejecting application {}", admin.id, id);

    let mut tx = state.db.begin().await?;

    fetch_pending_for_review(&mut tx, id).await?;

    let reviewed = sqlx::query_as::<_, FreelancerApplication>(&format!(
        "WITH updated AS ( \
             UPDATE freelancer_applications \
             SET status = 'REJECTED', reviewed_at = NOW(), reviewed_by = $2 \
             WHERE id = $1 \
             RETURNING * \
         ) \
         SELECT {APPLICATION_COLUMNS} \
         FROM updated a JOIN users u ON u.id = a.user_id"
    ))
    .bind(id)
    .bind(admin.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Application {} rejected", id);
    Ok(Json(reviewed))
}

/// Locks the application row and checks it is still pending
///
/// Returns 404 when the row does not exist and 409 when it has already
/// been reviewed. FOR UPDATE keeps a concurrent review from racing past
/// the status check.
async fn fetch_pending_for_review(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i32,
) -> Result<PendingRow, ApiError> {
    let row = sqlx::query_as::<_, PendingRow>(
        "SELECT user_id, status FROM freelancer_applications WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Application".to_string(),
        id: id.to_string(),
    })?;

    if row.status != ApplicationStatus::Pending {
        return Err(ApiError::Conflict {
            message: format!("Application {} has already been reviewed", id),
        });
    }

    Ok(row)
}

#[derive(sqlx::FromRow)]
struct PendingRow {
    user_id: i32,
    status: ApplicationStatus,
}
