//! Lesson create/edit modal, scoped to one course.

use super::{MaterialSlots, SlotEdit, SubmitError, SubmitOutcome};
use crate::client::LearningApi;
use crate::models::{Lesson, LessonDraft};
use crate::store::{thunks, AppStore};
use crate::validation::{FieldErrors, FieldSource, FieldValue, LESSON_SCHEMA};

#[derive(Debug, Clone, PartialEq)]
pub struct LessonModal {
    course_id: String,
    lesson_id: Option<String>,
    version: Option<i64>,
    open: bool,
    pub title: String,
    pub text: String,
    pub materials: MaterialSlots,
    /// Raw text of the index input; parsed on submit.
    pub index_number: String,
    field_errors: FieldErrors,
    last_error: Option<SubmitError>,
}

/// The modal's input as the lesson schema sees it.
struct LessonInput<'a> {
    title: &'a str,
    materials: &'a [String],
    index_number: &'a str,
}

impl FieldSource for LessonInput<'_> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "title" => Some(FieldValue::Text(self.title)),
            "materials" => Some(FieldValue::List(self.materials)),
            "indexNumber" => Some(FieldValue::Text(self.index_number)),
            _ => None,
        }
    }
}

impl LessonModal {
    /// A closed modal for adding lessons to `course_id`.
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            lesson_id: None,
            version: None,
            open: false,
            title: String::new(),
            text: String::new(),
            materials: MaterialSlots::default(),
            index_number: "1".to_string(),
            field_errors: FieldErrors::new(),
            last_error: None,
        }
    }

    /// Open the modal seeded from `lesson`, or with creation defaults.
    pub fn open(&mut self, lesson: Option<&Lesson>) {
        match lesson {
            Some(lesson) => {
                self.lesson_id = Some(lesson.id.clone());
                self.version = Some(lesson.version);
                self.title = lesson.title.clone();
                self.text = lesson.text.clone();
                self.materials = MaterialSlots::from_items(&lesson.materials);
                self.index_number = lesson.index_number.to_string();
            }
            None => {
                let course_id = std::mem::take(&mut self.course_id);
                *self = Self::new(course_id);
            }
        }
        self.field_errors = FieldErrors::new();
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_editing(&self) -> bool {
        self.lesson_id.is_some()
    }

    pub fn edit_materials(&mut self, edit: SlotEdit) {
        self.materials = std::mem::take(&mut self.materials).apply(edit);
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// The failure of the last submit, kept after the modal closes.
    pub fn last_error(&self) -> Option<&SubmitError> {
        self.last_error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Validate the input and build the payload. Blank material slots are
    /// dropped first.
    fn draft(&self) -> Result<LessonDraft, FieldErrors> {
        let materials = self.materials.filled();
        LESSON_SCHEMA.validate(&LessonInput {
            title: &self.title,
            materials: &materials,
            index_number: &self.index_number,
        })?;

        let index_number = self.index_number.trim().parse::<i64>().map_err(|_| {
            let mut fields = FieldErrors::new();
            fields.insert("indexNumber", "Index number must be a positive integer");
            fields
        })?;

        Ok(LessonDraft {
            index_number,
            title: self.title.trim().to_string(),
            text: self.text.clone(),
            materials,
            expected_version: self.version,
        })
    }

    /// Validate, then add or update the lesson through the current-course
    /// thunks. Invalid input keeps the modal open and dispatches nothing;
    /// once a request has been made the modal closes whatever the outcome.
    pub async fn submit(
        &mut self,
        store: &mut AppStore,
        api: &dyn LearningApi,
    ) -> Result<SubmitOutcome<Lesson>, SubmitError> {
        let draft = match self.draft() {
            Ok(draft) => draft,
            Err(fields) => {
                self.field_errors = fields.clone();
                return Err(SubmitError::Validation(fields));
            }
        };
        self.field_errors = FieldErrors::new();

        let result = match &self.lesson_id {
            Some(id) => thunks::update_lesson(store, api, id, &draft)
                .await
                .map(SubmitOutcome::Updated),
            None => thunks::add_lesson_to_course(store, api, &self.course_id, &draft)
                .await
                .map(SubmitOutcome::Created),
        };
        self.open = false;

        match result {
            Ok(outcome) => {
                self.last_error = None;
                Ok(outcome)
            }
            Err(e) => {
                let error = SubmitError::Api(e);
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }
}
