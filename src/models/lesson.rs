//! Lesson model matching the frontend ILesson interface.

use serde::{Deserialize, Serialize};

use super::Course;

/// A lesson within a course, ordered by `index_number` (1-based).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    pub index_number: i64,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub materials: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

/// A lesson with its parent course embedded, for single-lesson display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonWithCourse {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub course: Course,
}

/// Payload for creating or replacing a lesson.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonDraft {
    pub index_number: i64,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub materials: Vec<String>,
    /// Expected version for optimistic concurrency control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}
