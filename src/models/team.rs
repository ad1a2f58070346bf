//! Team and membership models.

use serde::{Deserialize, Serialize};

use super::User;

/// A team with its leader and participants resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub team_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_leader_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_leader: Option<User>,
    #[serde(default)]
    pub participants: Vec<User>,
}

/// Association linking a user to a team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    pub user_id: String,
    pub team_id: String,
    pub created_at: String,
}

/// Request body for creating a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub team_name: String,
    #[serde(default)]
    pub team_leader_id: Option<String>,
}

/// Request body for inviting a user into a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMembershipRequest {
    pub user_id: String,
    pub team_id: String,
}

/// Display name of a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamName {
    pub id: String,
    pub team_name: String,
}
