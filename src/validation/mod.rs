//! Declarative form schemas.
//!
//! Each entity has a static table of field constraints. [`Schema::validate`]
//! evaluates a table against anything implementing [`FieldSource`] and
//! returns a per-field error map. The same tables guard the client-side
//! forms and the server's write endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{CourseDraft, LessonDraft, UpdateUserRequest};

/// A single constraint a field value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Text must be non-blank; a list must be present.
    Required,
    /// List must hold at least this many items.
    MinItems(usize),
    /// Every list item (or the text itself) must be an absolute URL.
    EachUrl,
    /// Integer greater than zero. Text input must parse as one.
    PositiveInteger,
    /// Text must not exceed this many characters.
    MaxLength(usize),
}

/// A constraint paired with the message shown when it fails.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub constraint: Constraint,
    pub message: &'static str,
}

impl Rule {
    pub const fn new(constraint: Constraint, message: &'static str) -> Self {
        Self {
            constraint,
            message,
        }
    }
}

/// Constraints for one named field, checked in order.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

/// A borrowed view of a field's current value.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
    Integer(i64),
}

/// Anything a schema can be evaluated against.
pub trait FieldSource {
    /// Returns the value of `name`, or `None` when the field is absent.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// Field name to first failing message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// A named table of field constraints.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Evaluate every field's rules and collect the first failure per field.
    pub fn validate(&self, source: &impl FieldSource) -> Result<(), FieldErrors> {
        self.check(source, false)
    }

    /// Like [`Schema::validate`] but skips fields the source does not carry.
    /// Used for partial updates.
    pub fn validate_present(&self, source: &impl FieldSource) -> Result<(), FieldErrors> {
        self.check(source, true)
    }

    fn check(&self, source: &impl FieldSource, skip_absent: bool) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for spec in self.fields {
            let value = source.field(spec.name);
            if skip_absent && value.is_none() {
                continue;
            }
            if let Some(rule) = spec.rules.iter().find(|r| !satisfies(r.constraint, value)) {
                errors.insert(spec.name, rule.message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn satisfies(constraint: Constraint, value: Option<FieldValue<'_>>) -> bool {
    match (constraint, value) {
        (Constraint::Required, None) => false,
        (Constraint::Required, Some(FieldValue::Text(s))) => !s.trim().is_empty(),
        (Constraint::Required, Some(_)) => true,

        (Constraint::MinItems(min), Some(FieldValue::List(items))) => items.len() >= min,
        (Constraint::MinItems(min), None) => min == 0,
        (Constraint::MinItems(_), Some(_)) => false,

        (Constraint::EachUrl, Some(FieldValue::List(items))) => items.iter().all(|i| is_url(i)),
        (Constraint::EachUrl, Some(FieldValue::Text(s))) => s.is_empty() || is_url(s),
        (Constraint::EachUrl, _) => true,

        (Constraint::PositiveInteger, Some(FieldValue::Integer(n))) => n > 0,
        (Constraint::PositiveInteger, Some(FieldValue::Text(s))) => {
            s.trim().parse::<i64>().map(|n| n > 0).unwrap_or(false)
        }
        (Constraint::PositiveInteger, _) => false,

        (Constraint::MaxLength(max), Some(FieldValue::Text(s))) => s.chars().count() <= max,
        (Constraint::MaxLength(_), _) => true,
    }
}

/// True when `candidate` parses as an absolute `http` or `https` URL with
/// a host. Other schemes (`javascript:`, `data:`, `file:`) are rejected.
pub fn is_url(candidate: &str) -> bool {
    url::Url::parse(candidate.trim())
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// Course: name, at least one tag, description, URL materials.
pub const COURSE_SCHEMA: Schema = Schema {
    entity: "course",
    fields: &[
        FieldSpec {
            name: "name",
            rules: &[Rule::new(Constraint::Required, "Course name is required")],
        },
        FieldSpec {
            name: "tags",
            rules: &[Rule::new(
                Constraint::MinItems(1),
                "At least one tag is required",
            )],
        },
        FieldSpec {
            name: "description",
            rules: &[Rule::new(Constraint::Required, "Description is required")],
        },
        FieldSpec {
            name: "materials",
            rules: &[Rule::new(Constraint::EachUrl, "Must be a valid URL")],
        },
    ],
};

/// Lesson: title, positive integer index, URL materials.
pub const LESSON_SCHEMA: Schema = Schema {
    entity: "lesson",
    fields: &[
        FieldSpec {
            name: "title",
            rules: &[Rule::new(Constraint::Required, "Title is required")],
        },
        FieldSpec {
            name: "materials",
            rules: &[
                Rule::new(Constraint::Required, "Materials are required"),
                Rule::new(Constraint::EachUrl, "Must be a valid URL"),
            ],
        },
        FieldSpec {
            name: "indexNumber",
            rules: &[
                Rule::new(Constraint::Required, "Index number is required"),
                Rule::new(
                    Constraint::PositiveInteger,
                    "Index number must be a positive integer",
                ),
            ],
        },
    ],
};

/// Account: first and last name.
pub const ACCOUNT_SCHEMA: Schema = Schema {
    entity: "account",
    fields: &[
        FieldSpec {
            name: "firstName",
            rules: &[
                Rule::new(Constraint::Required, "First name is required"),
                Rule::new(Constraint::MaxLength(100), "First name is too long"),
            ],
        },
        FieldSpec {
            name: "lastName",
            rules: &[
                Rule::new(Constraint::Required, "Last name is required"),
                Rule::new(Constraint::MaxLength(100), "Last name is too long"),
            ],
        },
    ],
};

impl FieldSource for CourseDraft {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::Text(&self.name)),
            "description" => Some(FieldValue::Text(&self.description)),
            "tags" => Some(FieldValue::List(&self.tags)),
            "materials" => Some(FieldValue::List(&self.materials)),
            _ => None,
        }
    }
}

impl FieldSource for LessonDraft {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "title" => Some(FieldValue::Text(&self.title)),
            "materials" => Some(FieldValue::List(&self.materials)),
            "indexNumber" => Some(FieldValue::Integer(self.index_number)),
            _ => None,
        }
    }
}

impl FieldSource for UpdateUserRequest {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "firstName" => self.first_name.as_deref().map(FieldValue::Text),
            "lastName" => self.last_name.as_deref().map(FieldValue::Text),
            _ => None,
        }
    }
}
