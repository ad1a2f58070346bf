//! `reqwest` implementation of [`LearningApi`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ClientError, LearningApi};
use crate::errors::ErrorResponse;
use crate::models::{
    Course, CourseDraft, Lesson, LessonDraft, LessonWithCourse, Membership, SetMembershipRequest,
    TeamName, UpdateUserRequest, User,
};

/// Success envelope as sent by the API handlers.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// API client talking to a LearnHub server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// `/api` followed by `segments`, each percent-encoded as a single
    /// path segment so ids cannot add segments or a query.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::BaseUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(format!("{} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if status.is_success() {
            let envelope: Envelope<T> =
                serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
            return Ok(envelope.data);
        }

        // Extractor rejections answer with plain text rather than an envelope.
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(envelope) => Err(ClientError::from_envelope(status.as_u16(), envelope.error)),
            Err(_) => Err(ClientError::Api {
                status: status.as_u16(),
                code: status
                    .canonical_reason()
                    .unwrap_or("HTTP_ERROR")
                    .to_string(),
                message: body,
            }),
        }
    }
}

#[async_trait]
impl LearningApi for HttpApiClient {
    async fn list_courses(&self) -> Result<Vec<Course>, ClientError> {
        self.send(self.client.get(self.url(&["courses"])?)).await
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course, ClientError> {
        self.send(self.client.post(self.url(&["courses"])?).json(draft))
            .await
    }

    async fn update_course(&self, id: &str, draft: &CourseDraft) -> Result<Course, ClientError> {
        self.send(
            self.client
                .put(self.url(&["courses", id])?)
                .json(draft),
        )
        .await
    }

    async fn get_course_by_id(&self, id: &str) -> Result<Course, ClientError> {
        self.send(self.client.get(self.url(&["courses", id])?))
            .await
    }

    async fn get_lesson_by_id(&self, id: &str) -> Result<LessonWithCourse, ClientError> {
        self.send(self.client.get(self.url(&["lessons", id])?))
            .await
    }

    async fn create_lesson(
        &self,
        course_id: &str,
        draft: &LessonDraft,
    ) -> Result<Lesson, ClientError> {
        self.send(
            self.client
                .post(self.url(&["courses", course_id, "lessons"])?)
                .json(draft),
        )
        .await
    }

    async fn update_lesson(&self, id: &str, draft: &LessonDraft) -> Result<Lesson, ClientError> {
        self.send(
            self.client
                .put(self.url(&["lessons", id])?)
                .json(draft),
        )
        .await
    }

    async fn update_user(
        &self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<User, ClientError> {
        self.send(
            self.client
                .put(self.url(&["users", id])?)
                .json(request),
        )
        .await
    }

    async fn get_team(&self, user_id: &str) -> Result<Vec<Membership>, ClientError> {
        self.send(self.client.get(self.url(&["users", user_id, "teams"])?))
            .await
    }

    async fn get_team_name(&self, team_id: &str) -> Result<String, ClientError> {
        let name: TeamName = self
            .send(self.client.get(self.url(&["teams", team_id, "name"])?))
            .await?;
        Ok(name.team_name)
    }

    async fn set_user(&self, request: &SetMembershipRequest) -> Result<Membership, ClientError> {
        self.send(self.client.post(self.url(&["memberships"])?).json(request))
            .await
    }
}
