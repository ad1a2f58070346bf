//! Typed client for the LearnHub REST API.
//!
//! [`LearningApi`] is the seam the store thunks, forms and views call
//! through. [`HttpApiClient`] implements it against the `/api` routes.
//! Every operation returns an explicit [`ClientError`] on failure.

mod http;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpApiClient;

use async_trait::async_trait;

use crate::errors::{codes, ErrorDetails};
use crate::models::{
    Course, CourseDraft, Lesson, LessonDraft, LessonWithCourse, Membership, SetMembershipRequest,
    UpdateUserRequest, User,
};
use crate::validation::FieldErrors;

/// Failure of a call through the API layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),
    /// The addressed record does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The server rejected the payload field by field.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// The record changed since it was read.
    #[error("{message}")]
    Conflict {
        message: String,
        current_version: Option<i64>,
    },
    /// Any other error envelope.
    #[error("{code} ({status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// The response body was not what the client expected.
    #[error("unexpected response: {0}")]
    Decode(String),
    /// The configured server address cannot be turned into request URLs.
    #[error("invalid base URL: {0}")]
    BaseUrl(String),
}

impl ClientError {
    /// Unrecoverable by retrying or by editing the input.
    pub fn is_fatal(&self) -> bool {
        match self {
            ClientError::Decode(_) | ClientError::BaseUrl(_) => true,
            ClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Map a server error envelope to a client error.
    pub fn from_envelope(status: u16, error: ErrorDetails) -> Self {
        match error.code.as_str() {
            codes::NOT_FOUND => ClientError::NotFound(error.message),
            codes::VALIDATION_ERROR => {
                let fields = error
                    .details
                    .and_then(|d| d.get("fields").cloned())
                    .and_then(|f| serde_json::from_value(f).ok())
                    .unwrap_or_default();
                ClientError::Validation(fields)
            }
            codes::VERSION_MISMATCH => ClientError::Conflict {
                current_version: error
                    .details
                    .and_then(|d| d.get("currentVersion").and_then(|v| v.as_i64())),
                message: error.message,
            },
            _ => ClientError::Api {
                status,
                code: error.code,
                message: error.message,
            },
        }
    }
}

/// Operations the frontend performs against the record store.
#[async_trait]
pub trait LearningApi: Send + Sync {
    /// Bulk fetch for the course list.
    async fn list_courses(&self) -> Result<Vec<Course>, ClientError>;

    /// createCourseApi: persist a new course and return it with its id.
    async fn create_course(&self, draft: &CourseDraft) -> Result<Course, ClientError>;

    /// updateCourseApi: replace an existing course's fields.
    async fn update_course(&self, id: &str, draft: &CourseDraft) -> Result<Course, ClientError>;

    /// getCourseByIdApi: the full course including its lessons.
    async fn get_course_by_id(&self, id: &str) -> Result<Course, ClientError>;

    /// getLessonByIdApi: a lesson with its course embedded.
    async fn get_lesson_by_id(&self, id: &str) -> Result<LessonWithCourse, ClientError>;

    async fn create_lesson(
        &self,
        course_id: &str,
        draft: &LessonDraft,
    ) -> Result<Lesson, ClientError>;

    async fn update_lesson(&self, id: &str, draft: &LessonDraft) -> Result<Lesson, ClientError>;

    async fn update_user(
        &self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<User, ClientError>;

    /// getTeam: the memberships of a user, possibly empty.
    async fn get_team(&self, user_id: &str) -> Result<Vec<Membership>, ClientError>;

    /// getTeamName: the display name of a team.
    async fn get_team_name(&self, team_id: &str) -> Result<String, ClientError>;

    /// setUser: associate a user with a team.
    async fn set_user(&self, request: &SetMembershipRequest) -> Result<Membership, ClientError>;
}
