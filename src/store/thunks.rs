//! Asynchronous store operations.
//!
//! Each thunk marks its slice as loading, performs one API call, and
//! dispatches the result. Nothing is applied before the call succeeds, so a
//! failure leaves the cached data as it was and only flips the status.

use super::{Action, AppStore, CoursesAction, CurrentCourseAction};
use crate::client::{ClientError, LearningApi};
use crate::models::{Course, Lesson, LessonDraft};

/// Load the full course list.
pub async fn fetch_courses(
    store: &mut AppStore,
    api: &dyn LearningApi,
) -> Result<(), ClientError> {
    store.dispatch(Action::Courses(CoursesAction::Pending));
    match api.list_courses().await {
        Ok(courses) => {
            store.dispatch(Action::Courses(CoursesAction::Loaded(courses)));
            Ok(())
        }
        Err(e) => {
            tracing::warn!("fetching courses failed: {}", e);
            store.dispatch(Action::Courses(CoursesAction::Rejected(e.to_string())));
            Err(e)
        }
    }
}

/// Load one course with its lessons into the current course slice.
pub async fn fetch_current_course(
    store: &mut AppStore,
    api: &dyn LearningApi,
    course_id: &str,
) -> Result<Course, ClientError> {
    store.dispatch(Action::CurrentCourse(CurrentCourseAction::Pending));
    match api.get_course_by_id(course_id).await {
        Ok(course) => {
            store.dispatch(Action::CurrentCourse(CurrentCourseAction::Loaded(
                course.clone(),
            )));
            Ok(course)
        }
        Err(e) => Err(reject_current_course(store, "fetching course", e)),
    }
}

/// Create a lesson under `course_id` and splice it into the cached course.
pub async fn add_lesson_to_course(
    store: &mut AppStore,
    api: &dyn LearningApi,
    course_id: &str,
    draft: &LessonDraft,
) -> Result<Lesson, ClientError> {
    store.dispatch(Action::CurrentCourse(CurrentCourseAction::Pending));
    match api.create_lesson(course_id, draft).await {
        Ok(lesson) => {
            tracing::info!(lesson_id = %lesson.id, course_id = %course_id, "lesson added");
            store.dispatch(Action::CurrentCourse(CurrentCourseAction::LessonAdded(
                lesson.clone(),
            )));
            Ok(lesson)
        }
        Err(e) => Err(reject_current_course(store, "adding lesson", e)),
    }
}

/// Replace a lesson and swap it in the cached course.
///
/// When the draft carries no expected version, the cached lesson's version
/// is sent so a concurrent edit is reported instead of overwritten.
pub async fn update_lesson(
    store: &mut AppStore,
    api: &dyn LearningApi,
    lesson_id: &str,
    draft: &LessonDraft,
) -> Result<Lesson, ClientError> {
    let mut draft = draft.clone();
    if draft.expected_version.is_none() {
        draft.expected_version = store.current_course.lesson(lesson_id).map(|l| l.version);
    }

    store.dispatch(Action::CurrentCourse(CurrentCourseAction::Pending));
    match api.update_lesson(lesson_id, &draft).await {
        Ok(lesson) => {
            tracing::info!(lesson_id = %lesson.id, version = lesson.version, "lesson updated");
            store.dispatch(Action::CurrentCourse(CurrentCourseAction::LessonUpdated(
                lesson.clone(),
            )));
            Ok(lesson)
        }
        Err(e) => Err(reject_current_course(store, "updating lesson", e)),
    }
}

fn reject_current_course(store: &mut AppStore, what: &str, error: ClientError) -> ClientError {
    tracing::warn!("{} failed: {}", what, error);
    store.dispatch(Action::CurrentCourse(CurrentCourseAction::Rejected(
        error.to_string(),
    )));
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{Call, FakeApi};
    use crate::store::Status;

    fn lesson(id: &str, index: i64, version: i64) -> Lesson {
        Lesson {
            id: id.to_string(),
            course_id: "c1".to_string(),
            index_number: index,
            title: "Ownership".to_string(),
            text: String::new(),
            materials: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
            version,
        }
    }

    fn course(lessons: Vec<Lesson>) -> Course {
        Course {
            id: "c1".to_string(),
            name: "Rust".to_string(),
            description: "d".to_string(),
            course_image_url: None,
            author_id: "a1".to_string(),
            tags: vec!["rust".to_string()],
            materials: Vec::new(),
            lessons: Some(lessons),
            created_at: String::new(),
            updated_at: String::new(),
            version: 1,
        }
    }

    fn draft(index: i64) -> LessonDraft {
        LessonDraft {
            index_number: index,
            title: "Borrowing".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fetch_courses_fills_slice() {
        let api = FakeApi::new().with_course(course(Vec::new()));
        let mut store = AppStore::new();

        fetch_courses(&mut store, &api).await.unwrap();

        assert_eq!(store.courses.items.len(), 1);
        assert_eq!(store.courses.status, Status::Succeeded);
    }

    #[tokio::test]
    async fn failed_add_keeps_cached_lessons() {
        let api = FakeApi::new()
            .with_course(course(vec![lesson("l1", 1, 1)]))
            .failing("create_lesson", ClientError::Network("offline".to_string()));
        let mut store = AppStore::new();
        fetch_current_course(&mut store, &api, "c1").await.unwrap();

        let err = add_lesson_to_course(&mut store, &api, "c1", &draft(2))
            .await
            .unwrap_err();

        assert_eq!(err, ClientError::Network("offline".to_string()));
        let lessons = store.current_course.course.as_ref().unwrap().lessons.as_ref().unwrap();
        assert_eq!(lessons.len(), 1);
        assert!(matches!(store.current_course.status, Status::Failed(_)));
    }

    #[tokio::test]
    async fn added_lesson_is_spliced_into_current_course() {
        let api = FakeApi::new().with_course(course(vec![lesson("l1", 1, 1)]));
        let mut store = AppStore::new();
        fetch_current_course(&mut store, &api, "c1").await.unwrap();

        let added = add_lesson_to_course(&mut store, &api, "c1", &draft(2))
            .await
            .unwrap();

        assert_eq!(store.current_course.lesson(&added.id).map(|l| l.index_number), Some(2));
    }

    #[tokio::test]
    async fn update_sends_cached_version() {
        let api = FakeApi::new().with_course(course(vec![lesson("l1", 1, 3)]));
        let mut store = AppStore::new();
        fetch_current_course(&mut store, &api, "c1").await.unwrap();

        let updated = update_lesson(&mut store, &api, "l1", &draft(1)).await.unwrap();

        let sent = api.calls().into_iter().find_map(|c| match c {
            Call::UpdateLesson(_, d) => Some(d),
            _ => None,
        });
        assert_eq!(sent.and_then(|d| d.expected_version), Some(3));
        assert_eq!(updated.version, 4);
        assert_eq!(
            store.current_course.lesson("l1").map(|l| l.title.as_str()),
            Some("Borrowing")
        );
    }
}
