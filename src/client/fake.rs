//! In-memory [`LearningApi`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ClientError, LearningApi};
use crate::models::{
    Course, CourseDraft, Lesson, LessonDraft, LessonWithCourse, Membership, SetMembershipRequest,
    UpdateUserRequest, User,
};

/// A recorded call, in the order it was issued.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListCourses,
    CreateCourse(CourseDraft),
    UpdateCourse(String, CourseDraft),
    GetCourse(String),
    GetLesson(String),
    CreateLesson(String, LessonDraft),
    UpdateLesson(String, LessonDraft),
    UpdateUser(String, UpdateUserRequest),
    GetTeam(String),
    GetTeamName(String),
    SetUser(String, String),
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    courses: HashMap<String, Course>,
    lessons: HashMap<String, LessonWithCourse>,
    users: HashMap<String, User>,
    memberships: HashMap<String, Vec<Membership>>,
    team_names: HashMap<String, String>,
    name_delays: HashMap<String, Duration>,
    failures: HashMap<&'static str, ClientError>,
    next_id: u32,
}

#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<Inner>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(self, course: Course) -> Self {
        self.lock().courses.insert(course.id.clone(), course);
        self
    }

    pub fn with_lesson(self, lesson: LessonWithCourse) -> Self {
        self.lock().lessons.insert(lesson.lesson.id.clone(), lesson);
        self
    }

    pub fn with_user(self, user: User) -> Self {
        self.lock().users.insert(user.id.clone(), user);
        self
    }

    pub fn with_team(self, team_id: &str, name: &str) -> Self {
        self.lock()
            .team_names
            .insert(team_id.to_string(), name.to_string());
        self
    }

    pub fn with_membership(self, user_id: &str, team_id: &str) -> Self {
        {
            let mut inner = self.lock();
            let membership = inner.membership(user_id, team_id);
            inner
                .memberships
                .entry(user_id.to_string())
                .or_default()
                .push(membership);
        }
        self
    }

    /// Delay the name lookup of one team, to control completion order.
    pub fn with_name_delay(self, team_id: &str, delay: Duration) -> Self {
        self.lock().name_delays.insert(team_id.to_string(), delay);
        self
    }

    /// Make every call to `operation` fail with `error`.
    pub fn failing(self, operation: &'static str, error: ClientError) -> Self {
        self.lock().failures.insert(operation, error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn course(&self, id: &str) -> Option<Course> {
        self.lock().courses.get(id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), ClientError> {
        let mut inner = self.lock();
        inner.calls.push(call);
        match inner.failures.get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Inner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn membership(&mut self, user_id: &str, team_id: &str) -> Membership {
        Membership {
            id: self.next_id("membership"),
            user_id: user_id.to_string(),
            team_id: team_id.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }
}

fn course_from_draft(id: String, draft: &CourseDraft, version: i64) -> Course {
    Course {
        id,
        name: draft.name.clone(),
        description: draft.description.clone(),
        course_image_url: draft.course_image_url.clone(),
        author_id: draft.author_id.clone(),
        tags: draft.tags.clone(),
        materials: draft.materials.clone(),
        lessons: None,
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
        version,
    }
}

fn lesson_from_draft(id: String, course_id: &str, draft: &LessonDraft, version: i64) -> Lesson {
    Lesson {
        id,
        course_id: course_id.to_string(),
        index_number: draft.index_number,
        title: draft.title.clone(),
        text: draft.text.clone(),
        materials: draft.materials.clone(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
        version,
    }
}

#[async_trait]
impl LearningApi for FakeApi {
    async fn list_courses(&self) -> Result<Vec<Course>, ClientError> {
        self.record("list_courses", Call::ListCourses)?;
        let mut courses: Vec<Course> = self.lock().courses.values().cloned().collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(courses)
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course, ClientError> {
        self.record("create_course", Call::CreateCourse(draft.clone()))?;
        let mut inner = self.lock();
        let id = inner.next_id("course");
        let course = course_from_draft(id, draft, 1);
        inner.courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: &str, draft: &CourseDraft) -> Result<Course, ClientError> {
        self.record(
            "update_course",
            Call::UpdateCourse(id.to_string(), draft.clone()),
        )?;
        let mut inner = self.lock();
        let version = inner
            .courses
            .get(id)
            .map(|c| c.version + 1)
            .ok_or_else(|| ClientError::NotFound(format!("Course {} not found", id)))?;
        let course = course_from_draft(id.to_string(), draft, version);
        inner.courses.insert(id.to_string(), course.clone());
        Ok(course)
    }

    async fn get_course_by_id(&self, id: &str) -> Result<Course, ClientError> {
        self.record("get_course_by_id", Call::GetCourse(id.to_string()))?;
        self.course(id)
            .ok_or_else(|| ClientError::NotFound(format!("Course {} not found", id)))
    }

    async fn get_lesson_by_id(&self, id: &str) -> Result<LessonWithCourse, ClientError> {
        self.record("get_lesson_by_id", Call::GetLesson(id.to_string()))?;
        self.lock()
            .lessons
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Lesson {} not found", id)))
    }

    async fn create_lesson(
        &self,
        course_id: &str,
        draft: &LessonDraft,
    ) -> Result<Lesson, ClientError> {
        self.record(
            "create_lesson",
            Call::CreateLesson(course_id.to_string(), draft.clone()),
        )?;
        let mut inner = self.lock();
        let id = inner.next_id("lesson");
        Ok(lesson_from_draft(id, course_id, draft, 1))
    }

    async fn update_lesson(&self, id: &str, draft: &LessonDraft) -> Result<Lesson, ClientError> {
        self.record(
            "update_lesson",
            Call::UpdateLesson(id.to_string(), draft.clone()),
        )?;
        let course_id = {
            let inner = self.lock();
            inner
                .lessons
                .get(id)
                .map(|l| l.lesson.course_id.clone())
                .or_else(|| {
                    inner.courses.values().find_map(|c| {
                        c.lessons
                            .as_ref()?
                            .iter()
                            .find(|l| l.id == id)
                            .map(|l| l.course_id.clone())
                    })
                })
                .ok_or_else(|| ClientError::NotFound(format!("Lesson {} not found", id)))?
        };
        let version = draft.expected_version.unwrap_or(1) + 1;
        Ok(lesson_from_draft(id.to_string(), &course_id, draft, version))
    }

    async fn update_user(
        &self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<User, ClientError> {
        self.record(
            "update_user",
            Call::UpdateUser(id.to_string(), request.clone()),
        )?;
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(id)
            .ok_or_else(|| ClientError::NotFound(format!("User {} not found", id)))?;
        if let Some(first_name) = &request.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &request.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(avatar_url) = &request.avatar_url {
            user.avatar_url = avatar_url.clone();
        }
        Ok(user.clone())
    }

    async fn get_team(&self, user_id: &str) -> Result<Vec<Membership>, ClientError> {
        self.record("get_team", Call::GetTeam(user_id.to_string()))?;
        Ok(self
            .lock()
            .memberships
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_team_name(&self, team_id: &str) -> Result<String, ClientError> {
        self.record("get_team_name", Call::GetTeamName(team_id.to_string()))?;
        let delay = self.lock().name_delays.get(team_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.lock()
            .team_names
            .get(team_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Team {} not found", team_id)))
    }

    async fn set_user(&self, request: &SetMembershipRequest) -> Result<Membership, ClientError> {
        self.record(
            "set_user",
            Call::SetUser(request.user_id.clone(), request.team_id.clone()),
        )?;
        let mut inner = self.lock();
        let membership = inner.membership(&request.user_id, &request.team_id);
        inner
            .memberships
            .entry(request.user_id.clone())
            .or_default()
            .push(membership.clone());
        Ok(membership)
    }
}
