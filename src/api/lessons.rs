//! Lesson API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{require_expected_version, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Lesson, LessonDraft, LessonWithCourse};
use crate::validation::LESSON_SCHEMA;
use crate::AppState;

/// GET /api/lessons/:id - Get a lesson with its course embedded.
pub async fn get_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<LessonWithCourse> {
    match state.repo.get_lesson_with_course(&id).await? {
        Some(lesson) => success(lesson),
        None => Err(AppError::NotFound(format!("Lesson {} not found", id))),
    }
}

/// PUT /api/lessons/:id - Replace a lesson's fields.
pub async fn update_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<LessonDraft>,
) -> ApiResult<Lesson> {
    LESSON_SCHEMA
        .validate(&draft)
        .map_err(|fields| AppError::validation(LESSON_SCHEMA.entity, fields))?;
    require_expected_version(draft.expected_version)?;

    let lesson = state.repo.update_lesson(&id, &draft).await?;
    tracing::info!(lesson_id = %lesson.id, version = lesson.version, "lesson updated");
    success(lesson)
}
