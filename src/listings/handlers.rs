// HTTP handlers for service listings
// Browsing is public; mutations sit behind the freelancer gate under /api/my

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::extract::Json;
use crate::listings::models::{CreateServiceRequest, Service, UpdateServiceRequest};
use crate::query::{QueryParams, QueryValidator, SqlQueryBuilder};
use crate::AppState;

const SERVICE_COLUMNS: &str =
    "id, freelancer_id, title, description, category, price_cents, created_at, updated_at";

/// Browse service listings with filtering, sorting, and pagination
/// GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    params(
        ("search" = Option<String>, Query, description = "Partial title match"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("min_price" = Option<i64>, Query, description = "Minimum price in cents"),
        ("max_price" = Option<i64>, Query, description = "Maximum price in cents"),
        ("sort" = Option<String>, Query, description = "Sort field: price or created"),
        ("order" = Option<String>, Query, description = "Sort order: asc or desc"),
        ("page" = Option<u32>, Query, description = "Page number (1-indexed)"),
        ("limit" = Option<u32>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "List of services", body = Vec<Service>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "services"
)]
pub async fn list_services(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<Service>>, ApiError> {
    tracing::debug!("Listing services with params: {:?}", params);

    let validated =
        QueryValidator::validate(params).map_err(|e| ApiError::BadRequest(e.message))?;

    let mut builder = SqlQueryBuilder::new();
    if let Some(search) = validated.search {
        builder.add_search_filter(&search);
    }
    if let Some(category) = validated.category {
        builder.add_category_filter(&category);
    }
    builder.add_price_range(validated.min_price, validated.max_price);
    if let Some(sort_field) = validated.sort_field {
        builder.set_sort(sort_field, validated.sort_order);
    }
    builder.set_pagination(validated.page, validated.limit);

    let (query_str, params) = builder.build();

    let mut query = sqlx::query_as::<_, Service>(&query_str);
    for param in params {
        query = query.bind(param);
    }

    let services = query.fetch_all(&state.db).await?;

    tracing::debug!("Query returned {} services", services.len());
    Ok(Json(services))
}

/// Get a single service by ID
/// GET /api/services/:id
#[utoipa::path(
    get,
    path = "/api/services/{id}",
    params(
        ("id" = i32, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Service details", body = Service),
        (status = 404, description = "Service not found")
    ),
    tag = "services"
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Service>, ApiError> {
    let service = sqlx::query_as::<_, Service>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Service".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(service))
}

/// List the caller's own service listings
/// GET /api/my/services
#[utoipa::path(
    get,
    path = "/api/my/services",
    responses(
        (status = 200, description = "Caller's services", body = Vec<Service>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn list_own_services(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Service>>, ApiError> {
    let services = sqlx::query_as::<_, Service>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services \
         WHERE freelancer_id = $1 \
         ORDER BY created_at DESC"
    ))
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(services))
}

/// Create a new service listing
/// POST /api/my/services
#[utoipa::path(
    post,
    path = "/api/my/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn create_service(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    payload.validate()?;

    tracing::debug!("User {} creating service '{}'", user.id, payload.title);

    let service = sqlx::query_as::<_, Service>(&format!(
        "INSERT INTO services (freelancer_id, title, description, category, price_cents) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {SERVICE_COLUMNS}"
    ))
    .bind(user.id)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.category.to_lowercase())
    .bind(payload.price_cents)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Created service {} for user {}", service.id, user.id);
    Ok((StatusCode::CREATED, Json(service)))
}

/// Update one of the caller's service listings
/// PUT /api/my/services/:id
#[utoipa::path(
    put,
    path = "/api/my/services/{id}",
    params(
        ("id" = i32, Path, description = "Service ID")
    ),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = Service),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Service not found")
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn update_service(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateServiceRequest>,
) -> Result<Json<Service>, ApiError> {
    payload.validate()?;

    let owner_id = fetch_owner(&state, id).await?;
    if owner_id != user.id {
        tracing::warn!(
            "User {} attempted to update service {} owned by {}",
            user.id,
            id,
            owner_id
        );
        return Err(ApiError::Forbidden);
    }

    let service = sqlx::query_as::<_, Service>(&format!(
        "UPDATE services \
         SET title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             category = COALESCE($4, category), \
             price_cents = COALESCE($5, price_cents), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {SERVICE_COLUMNS}"
    ))
    .bind(id)
    .bind(payload.title)
    .bind(payload.description)
    .bind(payload.category.map(|c| c.to_lowercase()))
    .bind(payload.price_cents)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(service))
}

/// Delete one of the caller's service listings
/// DELETE /api/my/services/:id
#[utoipa::path(
    delete,
    path = "/api/my/services/{id}",
    params(
        ("id" = i32, Path, description = "Service ID")
    ),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Service not found")
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn delete_service(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let owner_id = fetch_owner(&state, id).await?;
    if owner_id != user.id {
        tracing::warn!(
            "User {} attempted to delete service {} owned by {}",
            user.id,
            id,
            owner_id
        );
        return Err(ApiError::Forbidden);
    }

    sqlx::query("DELETE FROM services WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    tracing::info!("Deleted service {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Looks up the service owner; 404 when the service does not exist
async fn fetch_owner(state: &AppState, id: i32) -> Result<i32, ApiError> {
    sqlx::query_scalar::<_, i32>("SELECT freelancer_id FROM services WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Service".to_string(),
            id: id.to_string(),
        })
}
