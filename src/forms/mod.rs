//! Form view models.
//!
//! Forms hold the user's in-progress input, validate it against the shared
//! schemas, and submit through a [`LearningApi`](crate::client::LearningApi).
//! A failed submit never discards input; the failure is returned to the
//! caller and also kept on the form as a dismissible error.

pub mod account;
pub mod course;
pub mod lesson;
pub mod list_editor;

pub use account::{AccountForm, AvatarDisplay, AvatarEditor, PendingFile};
pub use course::CourseForm;
pub use lesson::LessonModal;
pub use list_editor::{ListEdit, ListEditor, MaterialSlots, SlotEdit};

use crate::client::ClientError;
use crate::validation::FieldErrors;

/// What a successful submit did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    Created(T),
    Updated(T),
}

impl<T> SubmitOutcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            SubmitOutcome::Created(record) | SubmitOutcome::Updated(record) => record,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// Input failed the schema; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// No user is signed in to author the record.
    #[error("you must be signed in")]
    Unauthenticated,
    /// An edit was submitted before the record loaded, so there is no
    /// version to check against.
    #[error("the course has not been loaded; reload before saving")]
    NotLoaded,
    #[error(transparent)]
    Api(#[from] ClientError),
}

impl SubmitError {
    pub fn is_fatal(&self) -> bool {
        match self {
            SubmitError::Api(e) => e.is_fatal(),
            _ => false,
        }
    }
}
