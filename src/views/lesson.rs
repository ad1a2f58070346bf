//! Single lesson view.

use crate::client::{ClientError, LearningApi};
use crate::models::LessonWithCourse;

#[derive(Debug, Clone, PartialEq)]
pub enum LessonView {
    Loading,
    Loaded(LessonWithCourse),
    /// The lesson id does not exist. Terminal, unlike `Loading`.
    NotFound,
    Failed(String),
}

impl LessonView {
    pub async fn load(api: &dyn LearningApi, lesson_id: &str) -> Self {
        match api.get_lesson_by_id(lesson_id).await {
            Ok(lesson) => LessonView::Loaded(lesson),
            Err(ClientError::NotFound(_)) => LessonView::NotFound,
            Err(e) => {
                tracing::warn!(lesson_id = %lesson_id, "loading lesson failed: {}", e);
                LessonView::Failed(e.to_string())
            }
        }
    }

    /// Placeholder text for every state but `Loaded`.
    pub fn status_text(&self) -> Option<&str> {
        match self {
            LessonView::Loading => Some("Loading..."),
            LessonView::Loaded(_) => None,
            LessonView::NotFound => Some("Lesson not found"),
            LessonView::Failed(message) => Some(message.as_str()),
        }
    }
}
