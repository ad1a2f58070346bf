//! Read-mostly views backed by the API client.

pub mod lesson;
pub mod team_members;

pub use lesson::LessonView;
pub use team_members::{MemberControl, MemberRow, TeamMembersView};
