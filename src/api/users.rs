//! User API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, Membership, UpdateUserRequest, User};
use crate::validation::ACCOUNT_SCHEMA;
use crate::AppState;

/// GET /api/users - List all users.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    success(state.repo.list_users().await?)
}

/// GET /api/users/:id - Get a single user.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    match state.repo.get_user(&id).await? {
        Some(user) => success(user),
        None => Err(AppError::NotFound(format!("User {} not found", id))),
    }
}

/// POST /api/users - Create a new user.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<User> {
    let check = UpdateUserRequest {
        first_name: Some(request.first_name.clone()),
        last_name: Some(request.last_name.clone()),
        avatar_url: None,
    };
    ACCOUNT_SCHEMA
        .validate(&check)
        .map_err(|fields| AppError::validation(ACCOUNT_SCHEMA.entity, fields))?;

    success(state.repo.create_user(&request).await?)
}

/// PUT /api/users/:id - Update account fields.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    ACCOUNT_SCHEMA
        .validate_present(&request)
        .map_err(|fields| AppError::validation(ACCOUNT_SCHEMA.entity, fields))?;

    success(state.repo.update_user(&id, &request).await?)
}

/// GET /api/users/:id/teams - List a user's team memberships.
pub async fn list_user_teams(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Membership>> {
    if state.repo.get_user(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", id)));
    }

    success(state.repo.list_memberships(&id).await?)
}
