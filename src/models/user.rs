//! User model matching the frontend IUser interface.

use serde::{Deserialize, Serialize};

/// Role tags a user can hold.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    ADMIN,
    DEVELOPER,
    DESIGNER,
    TEAMLEADER,
    MANAGER,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ADMIN => "ADMIN",
            Role::DEVELOPER => "DEVELOPER",
            Role::DESIGNER => "DESIGNER",
            Role::TEAMLEADER => "TEAMLEADER",
            Role::MANAGER => "MANAGER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(Role::ADMIN),
            "DEVELOPER" => Some(Role::DEVELOPER),
            "DESIGNER" => Some(Role::DESIGNER),
            "TEAMLEADER" => Some(Role::TEAMLEADER),
            "MANAGER" => Some(Role::MANAGER),
            _ => None,
        }
    }
}

/// A platform user: learner, author or team leader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Never null; an empty list means no role tags.
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub updated_at: String,
}

/// Request body for creating a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Request body for the account form. `avatar_url` distinguishes
/// "leave as is" (absent) from "clear" (`null`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub avatar_url: Option<Option<String>>,
}

/// Serde helper keeping `null` apart from a missing field.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<Option<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}
