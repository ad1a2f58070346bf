//! Course API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{require_expected_version, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Course, CourseDraft, Lesson, LessonDraft};
use crate::validation::{COURSE_SCHEMA, LESSON_SCHEMA};
use crate::AppState;

/// GET /api/courses - List all courses.
pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    success(state.repo.list_courses().await?)
}

/// GET /api/courses/:id - Get a single course with its lessons.
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Course> {
    match state.repo.get_course(&id).await? {
        Some(course) => success(course),
        None => Err(AppError::NotFound(format!("Course {} not found", id))),
    }
}

/// POST /api/courses - Create a new course.
pub async fn create_course(
    State(state): State<AppState>,
    Json(draft): Json<CourseDraft>,
) -> ApiResult<Course> {
    COURSE_SCHEMA
        .validate(&draft)
        .map_err(|fields| AppError::validation(COURSE_SCHEMA.entity, fields))?;
    if draft.author_id.trim().is_empty() {
        return Err(AppError::BadRequest("Author id is required".to_string()));
    }

    let course = state.repo.create_course(&draft).await?;
    tracing::info!(course_id = %course.id, author_id = %course.author_id, "course created");
    success(course)
}

/// PUT /api/courses/:id - Replace a course's fields.
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<CourseDraft>,
) -> ApiResult<Course> {
    COURSE_SCHEMA
        .validate(&draft)
        .map_err(|fields| AppError::validation(COURSE_SCHEMA.entity, fields))?;
    if draft.author_id.trim().is_empty() {
        return Err(AppError::BadRequest("Author id is required".to_string()));
    }
    require_expected_version(draft.expected_version)?;

    let course = state.repo.update_course(&id, &draft).await?;
    tracing::info!(course_id = %course.id, version = course.version, "course updated");
    success(course)
}

/// POST /api/courses/:id/lessons - Create a lesson under a course.
pub async fn create_course_lesson(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(draft): Json<LessonDraft>,
) -> ApiResult<Lesson> {
    LESSON_SCHEMA
        .validate(&draft)
        .map_err(|fields| AppError::validation(LESSON_SCHEMA.entity, fields))?;

    let lesson = state.repo.create_lesson(&course_id, &draft).await?;
    tracing::info!(course_id = %course_id, lesson_id = %lesson.id, "lesson created");
    success(lesson)
}
