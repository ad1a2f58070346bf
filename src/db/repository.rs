//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Course, CourseDraft, CreateTeamRequest, CreateUserRequest, Lesson, LessonDraft,
    LessonWithCourse, Membership, Role, Team, UpdateUserRequest, User,
};

const USER_COLUMNS: &str =
    "id, first_name, last_name, avatar_url, role_id, team_id, email, roles, updated_at";
const COURSE_COLUMNS: &str = "id, name, description, course_image_url, author_id, tags, materials, created_at, updated_at, version";
const LESSON_COLUMNS: &str =
    "id, course_id, index_number, title, text, materials, created_at, updated_at, version";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY first_name, last_name",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Create a new user.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let roles_json = roles_to_json(&request.roles)?;

        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, avatar_url, role_id, team_id, email, roles, updated_at) VALUES (?, ?, ?, ?, ?, NULL, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.avatar_url)
        .bind(request.role_id)
        .bind(&request.email)
        .bind(&roles_json)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            avatar_url: request.avatar_url.clone(),
            role_id: request.role_id,
            team_id: None,
            email: request.email.clone(),
            roles: request.roles.clone(),
            updated_at: now,
        })
    }

    /// Update the account fields of a user.
    pub async fn update_user(
        &self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<User, AppError> {
        let existing = self
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        let now = Utc::now().to_rfc3339();
        let first_name = request
            .first_name
            .clone()
            .unwrap_or(existing.first_name.clone());
        let last_name = request
            .last_name
            .clone()
            .unwrap_or(existing.last_name.clone());
        let avatar_url = match &request.avatar_url {
            Some(value) => value.clone(),
            None => existing.avatar_url.clone(),
        };

        sqlx::query(
            "UPDATE users SET first_name = ?, last_name = ?, avatar_url = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&avatar_url)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(User {
            first_name,
            last_name,
            avatar_url,
            updated_at: now,
            ..existing
        })
    }

    // ==================== TEAM OPERATIONS ====================

    /// Create a new team.
    pub async fn create_team(&self, request: &CreateTeamRequest) -> Result<Team, AppError> {
        let team_leader = match &request.team_leader_id {
            Some(leader_id) => Some(self.get_user(leader_id).await?.ok_or_else(|| {
                AppError::NotFound(format!("Team leader {} not found", leader_id))
            })?),
            None => None,
        };

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO teams (id, team_name, team_leader_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&request.team_name)
            .bind(&request.team_leader_id)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(Team {
            id,
            team_name: request.team_name.clone(),
            team_leader_id: request.team_leader_id.clone(),
            team_leader,
            participants: Vec::new(),
        })
    }

    /// Get a team with its leader and participants.
    pub async fn get_team(&self, id: &str) -> Result<Option<Team>, AppError> {
        let Some(row) = sqlx::query("SELECT id, team_name, team_leader_id FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let team_leader_id: Option<String> = row.get("team_leader_id");
        let team_leader = match &team_leader_id {
            Some(leader_id) => self.get_user(leader_id).await?,
            None => None,
        };

        let participant_rows = sqlx::query(
            r#"SELECT u.id, u.first_name, u.last_name, u.avatar_url, u.role_id, u.team_id,
                      u.email, u.roles, u.updated_at
               FROM users u
               JOIN memberships m ON m.user_id = u.id
               WHERE m.team_id = ?
               ORDER BY m.created_at, u.first_name"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Team {
            id: row.get("id"),
            team_name: row.get("team_name"),
            team_leader_id,
            team_leader,
            participants: participant_rows.iter().map(user_from_row).collect(),
        }))
    }

    /// Get only the display name of a team.
    pub async fn get_team_name(&self, id: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT team_name FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("team_name")))
    }

    // ==================== MEMBERSHIP OPERATIONS ====================

    /// List the team memberships of a user, oldest first.
    pub async fn list_memberships(&self, user_id: &str) -> Result<Vec<Membership>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, team_id, created_at FROM memberships WHERE user_id = ? ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(membership_from_row).collect())
    }

    /// Associate a user with a team. Adding an existing pair returns the
    /// existing association.
    pub async fn add_membership(&self, user_id: &str, team_id: &str) -> Result<Membership, AppError> {
        if self.get_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        if self.get_team_name(team_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Team {} not found", team_id)));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT OR IGNORE INTO memberships (id, user_id, team_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(team_id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(
            "SELECT id, user_id, team_id, created_at FROM memberships WHERE user_id = ? AND team_id = ?",
        )
        .bind(user_id)
        .bind(team_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(membership_from_row(&row))
    }

    // ==================== COURSE OPERATIONS ====================

    /// List all courses, without their lessons.
    pub async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM courses ORDER BY name",
            COURSE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(course_from_row).collect())
    }

    /// Get a course by ID, without its lessons.
    pub async fn get_course_summary(&self, id: &str) -> Result<Option<Course>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM courses WHERE id = ?",
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(course_from_row))
    }

    /// Get a course by ID with its lessons ordered by index number.
    pub async fn get_course(&self, id: &str) -> Result<Option<Course>, AppError> {
        let Some(mut course) = self.get_course_summary(id).await? else {
            return Ok(None);
        };

        course.lessons = Some(self.list_lessons(id).await?);
        Ok(Some(course))
    }

    /// Create a new course.
    pub async fn create_course(&self, draft: &CourseDraft) -> Result<Course, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let tags_json = serde_json::to_string(&draft.tags)?;
        let materials_json = serde_json::to_string(&draft.materials)?;

        sqlx::query(
            "INSERT INTO courses (id, name, description, course_image_url, author_id, tags, materials, created_at, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1)"
        )
        .bind(&id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.course_image_url)
        .bind(&draft.author_id)
        .bind(&tags_json)
        .bind(&materials_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Course {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            course_image_url: draft.course_image_url.clone(),
            author_id: draft.author_id.clone(),
            tags: draft.tags.clone(),
            materials: draft.materials.clone(),
            lessons: None,
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        })
    }

    /// Replace a course's fields with optimistic concurrency control.
    pub async fn update_course(&self, id: &str, draft: &CourseDraft) -> Result<Course, AppError> {
        let existing = self
            .get_course_summary(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))?;

        // Check version for optimistic concurrency
        check_version(draft.expected_version, existing.version)?;

        let now = Utc::now().to_rfc3339();
        let new_version = existing.version + 1;
        let tags_json = serde_json::to_string(&draft.tags)?;
        let materials_json = serde_json::to_string(&draft.materials)?;

        // Use conditional UPDATE with version check to prevent race conditions
        let result = sqlx::query(
            "UPDATE courses SET name = ?, description = ?, course_image_url = ?, author_id = ?, tags = ?, materials = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?"
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.course_image_url)
        .bind(&draft.author_id)
        .bind(&tags_json)
        .bind(&materials_json)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Race condition - version changed between read and write
            let current = self.get_course_summary(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|c| c.version).unwrap_or(0),
            });
        }

        Ok(Course {
            id: id.to_string(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            course_image_url: draft.course_image_url.clone(),
            author_id: draft.author_id.clone(),
            tags: draft.tags.clone(),
            materials: draft.materials.clone(),
            lessons: None,
            created_at: existing.created_at,
            updated_at: now,
            version: new_version,
        })
    }

    // ==================== LESSON OPERATIONS ====================

    /// List the lessons of a course ordered by index number.
    pub async fn list_lessons(&self, course_id: &str) -> Result<Vec<Lesson>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM lessons WHERE course_id = ? ORDER BY index_number, created_at",
            LESSON_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(lesson_from_row).collect())
    }

    /// Get a lesson by ID.
    pub async fn get_lesson(&self, id: &str) -> Result<Option<Lesson>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM lessons WHERE id = ?",
            LESSON_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(lesson_from_row))
    }

    /// Get a lesson with its parent course embedded.
    pub async fn get_lesson_with_course(
        &self,
        id: &str,
    ) -> Result<Option<LessonWithCourse>, AppError> {
        let Some(lesson) = self.get_lesson(id).await? else {
            return Ok(None);
        };

        let course = self
            .get_course_summary(&lesson.course_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Lesson {} references a missing course", id))
            })?;

        Ok(Some(LessonWithCourse { lesson, course }))
    }

    /// Create a lesson under an existing course.
    pub async fn create_lesson(
        &self,
        course_id: &str,
        draft: &LessonDraft,
    ) -> Result<Lesson, AppError> {
        if self.get_course_summary(course_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Course {} not found", course_id)));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let materials_json = serde_json::to_string(&draft.materials)?;

        sqlx::query(
            "INSERT INTO lessons (id, course_id, index_number, title, text, materials, created_at, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)"
        )
        .bind(&id)
        .bind(course_id)
        .bind(draft.index_number)
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(&materials_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Lesson {
            id,
            course_id: course_id.to_string(),
            index_number: draft.index_number,
            title: draft.title.clone(),
            text: draft.text.clone(),
            materials: draft.materials.clone(),
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        })
    }

    /// Replace a lesson's fields with optimistic concurrency control.
    pub async fn update_lesson(&self, id: &str, draft: &LessonDraft) -> Result<Lesson, AppError> {
        let existing = self
            .get_lesson(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lesson {} not found", id)))?;

        check_version(draft.expected_version, existing.version)?;

        let now = Utc::now().to_rfc3339();
        let new_version = existing.version + 1;
        let materials_json = serde_json::to_string(&draft.materials)?;

        let result = sqlx::query(
            "UPDATE lessons SET index_number = ?, title = ?, text = ?, materials = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?"
        )
        .bind(draft.index_number)
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(&materials_json)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_lesson(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|l| l.version).unwrap_or(0),
            });
        }

        Ok(Lesson {
            id: id.to_string(),
            course_id: existing.course_id,
            index_number: draft.index_number,
            title: draft.title.clone(),
            text: draft.text.clone(),
            materials: draft.materials.clone(),
            created_at: existing.created_at,
            updated_at: now,
            version: new_version,
        })
    }
}

fn check_version(expected: Option<i64>, current: i64) -> Result<(), AppError> {
    match expected {
        Some(expected) if expected != current => Err(AppError::Conflict {
            message: format!(
                "Version mismatch: expected {}, current {}",
                expected, current
            ),
            current_version: current,
        }),
        _ => Ok(()),
    }
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    let roles_str: String = row.get("roles");
    User {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        avatar_url: row.get("avatar_url"),
        role_id: row.get("role_id"),
        team_id: row.get("team_id"),
        email: row.get("email"),
        roles: parse_json_array(&roles_str)
            .iter()
            .filter_map(|r| Role::parse(r))
            .collect(),
        updated_at: row.get("updated_at"),
    }
}

fn membership_from_row(row: &sqlx::sqlite::SqliteRow) -> Membership {
    Membership {
        id: row.get("id"),
        user_id: row.get("user_id"),
        team_id: row.get("team_id"),
        created_at: row.get("created_at"),
    }
}

fn course_from_row(row: &sqlx::sqlite::SqliteRow) -> Course {
    let tags_str: String = row.get("tags");
    let materials_str: String = row.get("materials");
    Course {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        course_image_url: row.get("course_image_url"),
        author_id: row.get("author_id"),
        tags: parse_json_array(&tags_str),
        materials: parse_json_array(&materials_str),
        lessons: None,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn lesson_from_row(row: &sqlx::sqlite::SqliteRow) -> Lesson {
    let materials_str: String = row.get("materials");
    Lesson {
        id: row.get("id"),
        course_id: row.get("course_id"),
        index_number: row.get("index_number"),
        title: row.get("title"),
        text: row.get("text"),
        materials: parse_json_array(&materials_str),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn roles_to_json(roles: &[Role]) -> Result<String, AppError> {
    let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
    Ok(serde_json::to_string(&names)?)
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("repo.sqlite"))
            .await
            .unwrap();
        (Repository::new(pool), temp_dir)
    }

    fn course_draft(author_id: &str) -> CourseDraft {
        CourseDraft {
            name: "Databases".to_string(),
            description: "Relational modelling".to_string(),
            author_id: author_id.to_string(),
            tags: vec!["sql".to_string()],
            ..Default::default()
        }
    }

    fn lesson_draft(index_number: i64, title: &str) -> LessonDraft {
        LessonDraft {
            index_number,
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn course_lessons_come_back_in_index_order() {
        let (repo, _dir) = repo().await;
        let course = repo.create_course(&course_draft("author-1")).await.unwrap();

        repo.create_lesson(&course.id, &lesson_draft(2, "Joins"))
            .await
            .unwrap();
        repo.create_lesson(&course.id, &lesson_draft(1, "Tables"))
            .await
            .unwrap();

        let fetched = repo.get_course(&course.id).await.unwrap().unwrap();
        let titles: Vec<_> = fetched
            .lessons
            .unwrap()
            .into_iter()
            .map(|l| l.title)
            .collect();
        assert_eq!(titles, vec!["Tables", "Joins"]);
    }

    #[tokio::test]
    async fn lesson_under_missing_course_is_not_found() {
        let (repo, _dir) = repo().await;
        let err = repo
            .create_lesson("missing", &lesson_draft(1, "Orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn stale_course_update_conflicts() {
        let (repo, _dir) = repo().await;
        let course = repo.create_course(&course_draft("author-1")).await.unwrap();

        let mut draft = course_draft("author-1");
        draft.expected_version = Some(1);
        let updated = repo.update_course(&course.id, &draft).await.unwrap();
        assert_eq!(updated.version, 2);

        let err = repo.update_course(&course.id, &draft).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Conflict {
                current_version: 2,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn adding_a_membership_twice_is_idempotent() {
        let (repo, _dir) = repo().await;
        let user = repo
            .create_user(&CreateUserRequest {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                avatar_url: None,
                role_id: None,
                email: None,
                roles: vec![Role::DEVELOPER],
            })
            .await
            .unwrap();
        let team = repo
            .create_team(&CreateTeamRequest {
                team_name: "Alpha".to_string(),
                team_leader_id: None,
            })
            .await
            .unwrap();

        let first = repo.add_membership(&user.id, &team.id).await.unwrap();
        let second = repo.add_membership(&user.id, &team.id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(repo.list_memberships(&user.id).await.unwrap().len(), 1);

        let team = repo.get_team(&team.id).await.unwrap().unwrap();
        assert_eq!(team.participants.len(), 1);
        assert_eq!(team.participants[0].roles, vec![Role::DEVELOPER]);
    }

    #[tokio::test]
    async fn clearing_an_avatar_persists_null() {
        let (repo, _dir) = repo().await;
        let user = repo
            .create_user(&CreateUserRequest {
                first_name: "Alan".to_string(),
                last_name: "Turing".to_string(),
                avatar_url: Some("avatars/alan.png".to_string()),
                role_id: None,
                email: None,
                roles: Vec::new(),
            })
            .await
            .unwrap();

        let request = UpdateUserRequest {
            avatar_url: Some(None),
            ..Default::default()
        };
        let updated = repo.update_user(&user.id, &request).await.unwrap();
        assert_eq!(updated.avatar_url, None);
        assert_eq!(updated.first_name, "Alan");
    }
}
