//! Course create/edit form.

use super::{ListEdit, ListEditor, SubmitError, SubmitOutcome};
use crate::client::{ClientError, LearningApi};
use crate::models::{Course, CourseDraft, User};
use crate::validation::{FieldErrors, COURSE_SCHEMA};

#[derive(Debug, Clone, PartialEq)]
pub struct CourseForm {
    course_id: Option<String>,
    pub name: String,
    pub description: String,
    pub course_image_url: Option<String>,
    pub tags: ListEditor,
    pub materials: ListEditor,
    loaded_version: Option<i64>,
    field_errors: FieldErrors,
    error: Option<String>,
    list_path: String,
}

impl CourseForm {
    /// An empty form. With `course_id` set, the form edits that course
    /// once [`CourseForm::load`] has run.
    pub fn new(course_id: Option<String>, list_path: impl Into<String>) -> Self {
        Self {
            course_id,
            name: String::new(),
            description: String::new(),
            course_image_url: None,
            tags: ListEditor::default(),
            materials: ListEditor::default(),
            loaded_version: None,
            field_errors: FieldErrors::new(),
            error: None,
            list_path: list_path.into(),
        }
    }

    pub fn course_id(&self) -> Option<&str> {
        self.course_id.as_deref()
    }

    /// Version of the record last loaded, sent back as the expected version.
    pub fn loaded_version(&self) -> Option<i64> {
        self.loaded_version
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Where to go after a successful submit.
    pub fn navigate_to(&self) -> &str {
        &self.list_path
    }

    pub fn edit_tags(&mut self, edit: ListEdit) {
        self.tags = std::mem::take(&mut self.tags).apply(edit);
    }

    pub fn edit_materials(&mut self, edit: ListEdit) {
        self.materials = std::mem::take(&mut self.materials).apply(edit);
    }

    /// Fetch the course being edited and replace every field with it,
    /// discarding in-progress edits. A no-op for a new course.
    pub async fn load(&mut self, api: &dyn LearningApi) -> Result<(), ClientError> {
        let Some(id) = self.course_id.clone() else {
            return Ok(());
        };

        match api.get_course_by_id(&id).await {
            Ok(course) => {
                self.fill(&course);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(course_id = %id, "loading course failed: {}", e);
                self.error = Some(format!("Could not load course: {}", e));
                Err(e)
            }
        }
    }

    fn fill(&mut self, course: &Course) {
        self.name = course.name.clone();
        self.description = course.description.clone();
        self.course_image_url = course.course_image_url.clone();
        self.tags = ListEditor::from_items(course.tags.clone());
        self.materials = ListEditor::from_items(course.materials.clone());
        self.loaded_version = Some(course.version);
        self.field_errors = FieldErrors::new();
        self.error = None;
    }

    fn draft(&self, author_id: &str) -> CourseDraft {
        CourseDraft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            course_image_url: self
                .course_image_url
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            author_id: author_id.to_string(),
            tags: self.tags.items.clone(),
            materials: self.materials.items.clone(),
            expected_version: self.loaded_version,
        }
    }

    /// Validate, then create or update the course authored by `user`.
    ///
    /// No request is made unless validation passes and a user is signed in.
    pub async fn submit(
        &mut self,
        api: &dyn LearningApi,
        user: Option<&User>,
    ) -> Result<SubmitOutcome<Course>, SubmitError> {
        let author_id = user.map(|u| u.id.as_str()).unwrap_or_default();
        let draft = self.draft(author_id);

        if let Err(fields) = COURSE_SCHEMA.validate(&draft) {
            self.field_errors = fields.clone();
            return Err(SubmitError::Validation(fields));
        }
        self.field_errors = FieldErrors::new();

        if user.is_none() {
            self.error = Some(SubmitError::Unauthenticated.to_string());
            return Err(SubmitError::Unauthenticated);
        }

        let result = match &self.course_id {
            Some(id) => {
                if draft.expected_version.is_none() {
                    tracing::warn!(course_id = %id, "refusing to update a course that never loaded");
                    self.error = Some(SubmitError::NotLoaded.to_string());
                    return Err(SubmitError::NotLoaded);
                }
                api.update_course(id, &draft).await.map(SubmitOutcome::Updated)
            }
            None => api.create_course(&draft).await.map(SubmitOutcome::Created),
        };

        match result {
            Ok(outcome) => {
                let course = match &outcome {
                    SubmitOutcome::Created(c) | SubmitOutcome::Updated(c) => c,
                };
                tracing::info!(course_id = %course.id, version = course.version, "course saved");
                self.course_id = Some(course.id.clone());
                self.loaded_version = Some(course.version);
                self.error = None;
                Ok(outcome)
            }
            Err(ClientError::Validation(fields)) => {
                self.field_errors = fields.clone();
                Err(SubmitError::Validation(fields))
            }
            Err(e) => {
                tracing::warn!("saving course failed: {}", e);
                self.error = Some(format!("Could not save course: {}", e));
                Err(SubmitError::Api(e))
            }
        }
    }
}
