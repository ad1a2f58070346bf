//! Client application state.
//!
//! [`AppStore`] holds three slices, each with its own reducer. The store is
//! built empty and handed to the forms and views that need it; there is no
//! process-wide instance. Every change goes through [`AppStore::dispatch`],
//! so one action is applied fully before the next.

pub mod courses;
pub mod current_course;
pub mod current_user;
pub mod thunks;

pub use courses::{CoursesAction, CoursesState};
pub use current_course::{CurrentCourseAction, CurrentCourseState};
pub use current_user::CurrentUserAction;

use crate::models::User;

/// Progress of the last asynchronous operation on a slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CurrentUser(CurrentUserAction),
    Courses(CoursesAction),
    CurrentCourse(CurrentCourseAction),
    /// Logout or full navigation: every slice back to empty.
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppStore {
    pub current_user: Option<User>,
    pub courses: CoursesState,
    pub current_course: CurrentCourseState,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: Action) {
        tracing::debug!(?action, "dispatch");
        match action {
            Action::CurrentUser(action) => {
                self.current_user = current_user::reduce(self.current_user.take(), action);
            }
            Action::Courses(action) => {
                self.courses = courses::reduce(std::mem::take(&mut self.courses), action);
            }
            Action::CurrentCourse(action) => {
                self.current_course =
                    current_course::reduce(std::mem::take(&mut self.current_course), action);
            }
            Action::Reset => *self = Self::default(),
        }
    }
}
