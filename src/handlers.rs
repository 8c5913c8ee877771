use crate::config::Config;
use crate::enrichment::Enricher;
use crate::errors::AppError;
use crate::models::*;
use crate::repository::UserRepository;
use axum::{
    extract::{rejection::JsonRejection, RawQuery, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// User storage.
    pub repo: Arc<dyn UserRepository>,
    /// Name-inference client used on create.
    pub enricher: Arc<dyn Enricher>,
    /// Application configuration.
    pub config: Config,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /createuser
///
/// Enriches the name with age, gender and nationality and stores the user.
#[utoipa::path(
    post,
    path = "/createuser",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request"),
        (status = 502, description = "Enrichment failed"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(body) = payload.map_err(invalid_body)?;
    tracing::info!("POST /createuser - name: {:?}", body.name);

    let name = require_non_empty(&body.name, "name")?;
    let surname = require_non_empty(&body.surname, "surname")?;

    let enriched = state.enricher.enrich(&name).await?;
    let user = state
        .repo
        .create(NewUser::from_enriched(name, surname, enriched))
        .await?;

    tracing::info!("User {} created successfully", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /user
///
/// Lists users matching the optional filters, one page at a time.
#[utoipa::path(
    get,
    path = "/user",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = [User]),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<User>>, AppError> {
    let params = ListUsersQuery::from_raw(query.as_deref());
    let paging = params.paging(state.config.max_page_limit);
    let filter = params.filter();
    tracing::info!("GET /user - filter: {:?}, paging: {:?}", filter, paging);

    let users = state
        .repo
        .list_by_filter(&filter, paging.limit, paging.offset)
        .await?;

    tracing::debug!("Returning {} user(s)", users.len());
    Ok(Json(users))
}

/// PUT /updateuser?id=
///
/// Replaces the business fields of an existing user. No re-enrichment happens.
#[utoipa::path(
    put,
    path = "/updateuser",
    tag = "users",
    params(IdQuery),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(IdQuery::from_raw(query.as_deref()).id.as_deref())?;
    let Json(mut body) = payload.map_err(invalid_body)?;
    tracing::info!("PUT /updateuser - id: {}", id);

    body.name = require_non_empty(&body.name, "name")?;
    body.surname = require_non_empty(&body.surname, "surname")?;
    if body.age < 0 {
        return Err(AppError::BadRequest("age cannot be negative".to_string()));
    }

    let mut user = state.repo.get_by_id(id).await?;
    body.apply_to(&mut user);
    let user = state.repo.save(&user).await?;

    tracing::info!("User {} updated successfully", id);
    Ok(Json(user))
}

/// DELETE /deleteuser?id=
#[utoipa::path(
    delete,
    path = "/deleteuser",
    tag = "users",
    params(IdQuery),
    responses(
        (status = 200, description = "User deleted", body = DeleteUserResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<DeleteUserResponse>, AppError> {
    let id = parse_id(IdQuery::from_raw(query.as_deref()).id.as_deref())?;
    tracing::info!("DELETE /deleteuser - id: {}", id);

    let rows = state.repo.delete_by_id(id).await.map_err(|e| {
        tracing::error!("Could not delete user {}: {}", id, e);
        AppError::NotFound("Could not delete user".to_string())
    })?;
    if rows == 0 {
        tracing::info!("User with id={} not found", id);
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!("User {} deleted successfully", id);
    Ok(Json(DeleteUserResponse {
        message: "User deleted".to_string(),
        id,
    }))
}

/// Fallback for user routes called with an unsupported HTTP method.
pub async fn invalid_method() -> AppError {
    tracing::warn!("Invalid request method");
    AppError::BadRequest("Invalid request".to_string())
}

/// Parses the `id` query parameter. Missing, malformed and non-positive ids are rejected.
pub fn parse_id(raw: Option<&str>) -> Result<i64, AppError> {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(id) if id > 0 => Ok(id),
        _ => {
            tracing::warn!("Invalid id parameter: {:?}", raw);
            Err(AppError::BadRequest("Missing id parameter".to_string()))
        }
    }
}

/// Returns the trimmed value, rejecting empty and whitespace-only input.
fn require_non_empty(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        tracing::warn!("Field '{}' is empty", field);
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    tracing::warn!("Could not parse request body: {}", rejection.body_text());
    AppError::BadRequest("Could not parse request body".to_string())
}
