//! The authenticated user, set on login.

use crate::models::User;

#[derive(Debug, Clone, PartialEq)]
pub enum CurrentUserAction {
    Set(User),
    Clear,
}

pub fn reduce(_state: Option<User>, action: CurrentUserAction) -> Option<User> {
    match action {
        CurrentUserAction::Set(user) => Some(user),
        CurrentUserAction::Clear => None,
    }
}
