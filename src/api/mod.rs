//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod courses;
mod lessons;
mod teams;
mod users;

pub use courses::*;
pub use lessons::*;
pub use teams::*;
pub use users::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Updates must name the version they were based on.
fn require_expected_version(expected: Option<i64>) -> Result<i64, crate::errors::AppError> {
    expected.ok_or_else(|| {
        crate::errors::AppError::BadRequest("expectedVersion is required for updates".to_string())
    })
}
