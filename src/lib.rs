//! LearnHub backend.
//!
//! A REST backend with SQLite persistence for courses, lessons, users and
//! teams, server-rendered course and lesson pages, and the typed client,
//! client-side store and form view models the web frontend is built on.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod forms;
pub mod models;
pub mod pages;
pub mod store;
pub mod validation;
pub mod views;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Courses
        .route("/courses", get(api::list_courses).post(api::create_course))
        .route("/courses/{id}", get(api::get_course).put(api::update_course))
        .route("/courses/{id}/lessons", post(api::create_course_lesson))
        // Lessons
        .route("/lessons/{id}", get(api::get_lesson).put(api::update_lesson))
        // Users
        .route("/users", get(api::list_users).post(api::create_user))
        .route("/users/{id}", get(api::get_user).put(api::update_user))
        .route("/users/{id}/teams", get(api::list_user_teams))
        // Teams
        .route("/teams", post(api::create_team))
        .route("/teams/{id}", get(api::get_team))
        .route("/teams/{id}/name", get(api::get_team_name))
        .route("/memberships", post(api::create_membership));

    // Server-rendered pages read the record store directly
    let page_routes = Router::new()
        .route("/courses/{id}", get(pages::course_page))
        .route("/lessons/{id}", get(pages::lesson_page));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
