//! Server-rendered pages.
//!
//! Pages read the record store directly rather than going through the JSON
//! API, and answer a missing record with a static "not found" page.

use std::fmt::Write;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::config::{AssetUrlResolver, Config};
use crate::errors::AppError;
use crate::models::{Course, Lesson, LessonWithCourse};
use crate::validation::is_url;
use crate::AppState;

/// Configured links the pages render.
#[derive(Debug, Clone)]
pub struct PageContext {
    assets: AssetUrlResolver,
    course_list_path: String,
}

impl PageContext {
    pub fn new(assets: AssetUrlResolver, course_list_path: impl Into<String>) -> Self {
        Self {
            assets,
            course_list_path: course_list_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AssetUrlResolver::from_config(config),
            config.course_list_path.clone(),
        )
    }
}

/// GET /courses/:id - Course details with its lesson list.
pub async fn course_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.repo.get_course(&id).await {
        Ok(Some(course)) => {
            let context = PageContext::from_config(&state.config);
            Html(render_course(&course, &context)).into_response()
        }
        Ok(None) => {
            tracing::info!(course_id = %id, "course page requested for missing course");
            not_found("Course not found")
        }
        Err(e) => page_error(&e),
    }
}

/// GET /lessons/:id - A single lesson with its materials.
pub async fn lesson_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.repo.get_lesson_with_course(&id).await {
        Ok(Some(lesson)) => {
            let context = PageContext::from_config(&state.config);
            Html(render_lesson(&lesson, &context)).into_response()
        }
        Ok(None) => not_found("Lesson not found"),
        Err(e) => page_error(&e),
    }
}

fn not_found(message: &str) -> Response {
    let body = format!("<div>{}</div>", escape(message));
    (StatusCode::NOT_FOUND, Html(layout(message, &body))).into_response()
}

fn page_error(error: &AppError) -> Response {
    tracing::error!("page render failed: {}", error);
    (
        error.status_code(),
        Html(layout("Error", "<div>Something went wrong</div>")),
    )
        .into_response()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
        escape(title),
        body
    )
}

/// Render the course page body.
pub fn render_course(course: &Course, context: &PageContext) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<p class=\"back\"><a href=\"{}\">All courses</a></p>",
        escape(&context.course_list_path)
    );
    let _ = write!(body, "<section class=\"course-details\"><h1>{}</h1>", escape(&course.name));
    if let Some(src) = course
        .course_image_url
        .as_deref()
        .and_then(|path| context.assets.resolve(path))
    {
        let _ = write!(
            body,
            "<img class=\"course-image\" src=\"{}\" alt=\"{}\">",
            escape(&src),
            escape(&course.name)
        );
    }
    let _ = write!(body, "<p>{}</p>", escape(&course.description));

    if !course.tags.is_empty() {
        body.push_str("<ul class=\"tags\">");
        for tag in &course.tags {
            let _ = write!(body, "<li>{}</li>", escape(tag));
        }
        body.push_str("</ul>");
    }
    push_materials(&mut body, &course.materials);
    body.push_str("</section>");

    body.push_str("<section class=\"lessons\"><h2>Lessons</h2>");
    match course.lessons.as_deref() {
        Some(lessons) if !lessons.is_empty() => {
            body.push_str("<ol>");
            for lesson in lessons {
                push_lesson_link(&mut body, lesson);
            }
            body.push_str("</ol>");
        }
        _ => body.push_str("<p>No lessons yet</p>"),
    }
    body.push_str("</section>");

    layout(&course.name, &body)
}

/// Render the lesson page body.
pub fn render_lesson(item: &LessonWithCourse, context: &PageContext) -> String {
    let lesson = &item.lesson;
    let mut body = String::new();
    let _ = write!(
        body,
        "<p class=\"course\"><a href=\"/courses/{}\">{}</a></p>",
        escape(&item.course.id),
        escape(&item.course.name)
    );
    let _ = write!(
        body,
        "<h1>Lesson {}: {}</h1>",
        lesson.index_number,
        escape(&lesson.title)
    );
    let _ = write!(body, "<p>{}</p>", escape(&lesson.text));
    let _ = write!(
        body,
        "<p class=\"back\"><a href=\"{}\">All courses</a></p>",
        escape(&context.course_list_path)
    );
    push_materials(&mut body, &lesson.materials);

    layout(&lesson.title, &body)
}

fn push_lesson_link(body: &mut String, lesson: &Lesson) {
    let _ = write!(
        body,
        "<li><a href=\"/lessons/{}\">Lesson {}: {}</a></li>",
        escape(&lesson.id),
        lesson.index_number,
        escape(&lesson.title)
    );
}

fn push_materials(body: &mut String, materials: &[String]) {
    if materials.is_empty() {
        body.push_str("<p class=\"materials\">No materials</p>");
        return;
    }

    body.push_str("<ul class=\"materials\">");
    for material in materials {
        // Only web URLs become links; anything else is shown as text.
        if is_url(material) {
            let _ = write!(
                body,
                "<li><a href=\"{0}\" target=\"_blank\" rel=\"noopener noreferrer\">{0}</a></li>",
                escape(material.trim())
            );
        } else {
            let _ = write!(body, "<li>{}</li>", escape(material));
        }
    }
    body.push_str("</ul>");
}

/// Escape text for HTML element and attribute content.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
