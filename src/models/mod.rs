//! Data models shared by the server, the typed client and the view models.
//!
//! Wire names are camelCase to match the web frontend's interfaces.

mod course;
mod lesson;
mod team;
mod user;

pub use course::*;
pub use lesson::*;
pub use team::*;
pub use user::*;
