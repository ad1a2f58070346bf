//! Team and membership API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateTeamRequest, Membership, SetMembershipRequest, Team, TeamName};
use crate::validation::FieldErrors;
use crate::AppState;

/// POST /api/teams - Create a new team.
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamRequest>,
) -> ApiResult<Team> {
    if request.team_name.trim().is_empty() {
        let mut fields = FieldErrors::new();
        fields.insert("teamName", "Team name is required");
        return Err(AppError::validation("team", fields));
    }

    success(state.repo.create_team(&request).await?)
}

/// GET /api/teams/:id - Get a team with leader and participants.
pub async fn get_team(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Team> {
    match state.repo.get_team(&id).await? {
        Some(team) => success(team),
        None => Err(AppError::NotFound(format!("Team {} not found", id))),
    }
}

/// GET /api/teams/:id/name - Resolve a team id to its display name.
pub async fn get_team_name(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TeamName> {
    match state.repo.get_team_name(&id).await? {
        Some(team_name) => success(TeamName { id, team_name }),
        None => Err(AppError::NotFound(format!("Team {} not found", id))),
    }
}

/// POST /api/memberships - Invite a user into a team.
pub async fn create_membership(
    State(state): State<AppState>,
    Json(request): Json<SetMembershipRequest>,
) -> ApiResult<Membership> {
    let membership = state
        .repo
        .add_membership(&request.user_id, &request.team_id)
        .await?;
    tracing::info!(user_id = %membership.user_id, team_id = %membership.team_id, "membership set");
    success(membership)
}
