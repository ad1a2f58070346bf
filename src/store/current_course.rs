//! The course being viewed, with its nested lesson list.

use super::Status;
use crate::models::{Course, Lesson};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentCourseState {
    pub course: Option<Course>,
    pub status: Status,
}

impl CurrentCourseState {
    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.course
            .as_ref()?
            .lessons
            .as_ref()?
            .iter()
            .find(|l| l.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CurrentCourseAction {
    Pending,
    Loaded(Course),
    LessonAdded(Lesson),
    LessonUpdated(Lesson),
    Rejected(String),
    Clear,
}

pub fn reduce(mut state: CurrentCourseState, action: CurrentCourseAction) -> CurrentCourseState {
    match action {
        CurrentCourseAction::Pending => state.status = Status::Loading,
        CurrentCourseAction::Loaded(mut course) => {
            if let Some(lessons) = course.lessons.as_mut() {
                sort_lessons(lessons);
            }
            state.course = Some(course);
            state.status = Status::Succeeded;
        }
        CurrentCourseAction::LessonAdded(lesson) => {
            if let Some(lessons) = lessons_for(&mut state, &lesson) {
                lessons.push(lesson);
                sort_lessons(lessons);
            }
            state.status = Status::Succeeded;
        }
        CurrentCourseAction::LessonUpdated(lesson) => {
            if let Some(lessons) = lessons_for(&mut state, &lesson) {
                match lessons.iter_mut().find(|l| l.id == lesson.id) {
                    Some(slot) => *slot = lesson,
                    None => lessons.push(lesson),
                }
                sort_lessons(lessons);
            }
            state.status = Status::Succeeded;
        }
        CurrentCourseAction::Rejected(message) => state.status = Status::Failed(message),
        CurrentCourseAction::Clear => state = CurrentCourseState::default(),
    }
    state
}

/// The nested list of the cached course, if `lesson` belongs to it.
fn lessons_for<'a>(state: &'a mut CurrentCourseState, lesson: &Lesson) -> Option<&'a mut Vec<Lesson>> {
    let course = state.course.as_mut()?;
    if course.id != lesson.course_id {
        tracing::warn!(
            course_id = %course.id,
            lesson_course_id = %lesson.course_id,
            "lesson does not belong to the current course"
        );
        return None;
    }
    Some(course.lessons.get_or_insert_with(Vec::new))
}

fn sort_lessons(lessons: &mut [Lesson]) {
    lessons.sort_by(|a, b| {
        a.index_number
            .cmp(&b.index_number)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}
