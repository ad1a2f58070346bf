//! Course list slice.

use super::Status;
use crate::models::Course;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoursesState {
    pub items: Vec<Course>,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoursesAction {
    Pending,
    /// Bulk fetch result; replaces the whole list.
    Loaded(Vec<Course>),
    Added(Course),
    /// Replaces the course with the same id. Unknown ids are ignored.
    Updated(Course),
    Rejected(String),
    Clear,
}

pub fn reduce(mut state: CoursesState, action: CoursesAction) -> CoursesState {
    match action {
        CoursesAction::Pending => state.status = Status::Loading,
        CoursesAction::Loaded(items) => {
            state.items = items;
            state.status = Status::Succeeded;
        }
        CoursesAction::Added(course) => state.items.push(course),
        CoursesAction::Updated(course) => {
            if let Some(slot) = state.items.iter_mut().find(|c| c.id == course.id) {
                *slot = course;
            }
        }
        CoursesAction::Rejected(message) => state.status = Status::Failed(message),
        CoursesAction::Clear => state = CoursesState::default(),
    }
    state
}
