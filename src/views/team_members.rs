//! Team members view: who is in a team, and inviting those who are not.
//!
//! Loading happens in two concurrent waves. All users' memberships are
//! requested at once, then every distinct team id is resolved to its name
//! at once. Results are keyed by id, so the completion order of either wave
//! does not affect what is rendered.

use std::collections::{BTreeSet, HashMap};

use futures_util::future::join_all;

use crate::client::{ClientError, LearningApi};
use crate::models::{Membership, SetMembershipRequest, User};

/// Shown in place of a team name that has not resolved yet.
pub const LOADING_NAME: &str = "Loading...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberControl {
    /// Memberships for this user have not been fetched yet.
    Pending,
    /// The user belongs to no team.
    Invite,
    /// Names of the user's teams, in membership order.
    Teams(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub user_id: String,
    pub display_name: String,
    pub control: MemberControl,
}

#[derive(Debug, Clone)]
pub struct TeamMembersView {
    team_id: String,
    users: Vec<User>,
    memberships: HashMap<String, Vec<Membership>>,
    team_names: HashMap<String, String>,
    search: String,
}

impl TeamMembersView {
    /// `team_id` is the team invites are sent for.
    pub fn new(team_id: impl Into<String>, users: Vec<User>) -> Self {
        Self {
            team_id: team_id.into(),
            users,
            memberships: HashMap::new(),
            team_names: HashMap::new(),
            search: String::new(),
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Fetch every user's memberships, then every team name.
    ///
    /// Partial results are kept; the first failure is returned.
    pub async fn load(&mut self, api: &dyn LearningApi) -> Result<(), ClientError> {
        let user_ids: Vec<String> = self.users.iter().map(|u| u.id.clone()).collect();
        let first_error = self.fetch_memberships(api, &user_ids).await.err();
        let names = self.resolve_missing_names(api).await;
        match first_error {
            Some(e) => Err(e),
            None => names,
        }
    }

    /// Add `user_id` to this view's team, then refresh that user's row.
    pub async fn invite(
        &mut self,
        api: &dyn LearningApi,
        user_id: &str,
    ) -> Result<Membership, ClientError> {
        let membership = api
            .set_user(&SetMembershipRequest {
                user_id: user_id.to_string(),
                team_id: self.team_id.clone(),
            })
            .await?;
        tracing::info!(user_id = %user_id, team_id = %self.team_id, "user invited");

        self.fetch_memberships(api, &[user_id.to_string()]).await?;
        self.resolve_missing_names(api).await?;
        Ok(membership)
    }

    async fn fetch_memberships(
        &mut self,
        api: &dyn LearningApi,
        user_ids: &[String],
    ) -> Result<(), ClientError> {
        let results = join_all(user_ids.iter().map(|id| api.get_team(id))).await;

        let mut first_error = None;
        for (user_id, result) in user_ids.iter().zip(results) {
            match result {
                Ok(memberships) => {
                    self.memberships.insert(user_id.clone(), memberships);
                }
                Err(e) => {
                    tracing::warn!(user_id = %user_id, "fetching memberships failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn resolve_missing_names(&mut self, api: &dyn LearningApi) -> Result<(), ClientError> {
        let missing: Vec<String> = self
            .memberships
            .values()
            .flatten()
            .map(|m| m.team_id.clone())
            .filter(|id| !self.team_names.contains_key(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let results = join_all(missing.iter().map(|id| api.get_team_name(id))).await;

        let mut first_error = None;
        for (team_id, result) in missing.into_iter().zip(results) {
            match result {
                Ok(name) => {
                    self.team_names.insert(team_id, name);
                }
                Err(e) => {
                    tracing::warn!(team_id = %team_id, "resolving team name failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Users whose first name contains the search text, ignoring case.
    pub fn rows(&self) -> Vec<MemberRow> {
        let needle = self.search.trim().to_lowercase();
        self.users
            .iter()
            .filter(|u| u.first_name.to_lowercase().contains(&needle))
            .map(|u| MemberRow {
                user_id: u.id.clone(),
                display_name: format!("{} {}", u.first_name, u.last_name),
                control: self.control_for(&u.id),
            })
            .collect()
    }

    fn control_for(&self, user_id: &str) -> MemberControl {
        match self.memberships.get(user_id) {
            None => MemberControl::Pending,
            Some(memberships) if memberships.is_empty() => MemberControl::Invite,
            Some(memberships) => MemberControl::Teams(
                memberships
                    .iter()
                    .map(|m| {
                        self.team_names
                            .get(&m.team_id)
                            .cloned()
                            .unwrap_or_else(|| LOADING_NAME.to_string())
                    })
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::fake::{Call, FakeApi};

    fn user(id: &str, first_name: &str) -> User {
        User {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            avatar_url: None,
            role_id: None,
            team_id: None,
            email: None,
            roles: Vec::new(),
            updated_at: String::new(),
        }
    }

    fn control(view: &TeamMembersView, user_id: &str) -> MemberControl {
        view.rows()
            .into_iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.control)
            .unwrap()
    }

    #[tokio::test]
    async fn invite_only_for_users_without_memberships() {
        let api = FakeApi::new()
            .with_team("t-alpha", "Alpha")
            .with_membership("u2", "t-alpha");
        let mut view = TeamMembersView::new("t-alpha", vec![user("u1", "Ann"), user("u2", "Bob")]);
        assert_eq!(control(&view, "u1"), MemberControl::Pending);

        view.load(&api).await.unwrap();

        assert_eq!(control(&view, "u1"), MemberControl::Invite);
        assert_eq!(
            control(&view, "u2"),
            MemberControl::Teams(vec!["Alpha".to_string()])
        );
    }

    #[tokio::test]
    async fn rendering_is_independent_of_name_completion_order() {
        let users = vec![user("u1", "Ann"), user("u2", "Bob"), user("u3", "Cid")];
        let assignments = [("u1", "t1"), ("u1", "t2"), ("u2", "t3"), ("u3", "t1")];

        let mut rendered = Vec::new();
        for delays in [[30u64, 20, 10], [10, 20, 30], [20, 0, 30]] {
            let mut api = FakeApi::new()
                .with_team("t1", "One")
                .with_team("t2", "Two")
                .with_team("t3", "Three");
            for (team, delay) in ["t1", "t2", "t3"].into_iter().zip(delays) {
                api = api.with_name_delay(team, Duration::from_millis(delay));
            }
            for (user_id, team_id) in assignments {
                api = api.with_membership(user_id, team_id);
            }

            let mut view = TeamMembersView::new("t1", users.clone());
            view.load(&api).await.unwrap();
            rendered.push(view.rows());
        }

        assert_eq!(
            rendered[0].iter().map(|r| r.control.clone()).collect::<Vec<_>>(),
            vec![
                MemberControl::Teams(vec!["One".to_string(), "Two".to_string()]),
                MemberControl::Teams(vec!["Three".to_string()]),
                MemberControl::Teams(vec!["One".to_string()]),
            ]
        );
        assert!(rendered.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn each_team_name_is_requested_once() {
        let api = FakeApi::new()
            .with_team("t1", "One")
            .with_membership("u1", "t1")
            .with_membership("u2", "t1");
        let mut view = TeamMembersView::new("t1", vec![user("u1", "Ann"), user("u2", "Bob")]);

        view.load(&api).await.unwrap();

        let lookups = api
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::GetTeamName(_)))
            .count();
        assert_eq!(lookups, 1);
    }

    #[tokio::test]
    async fn unresolved_name_shows_loading() {
        let api = FakeApi::new().with_membership("u1", "t-ghost");
        let mut view = TeamMembersView::new("t1", vec![user("u1", "Ann")]);

        let err = view.load(&api).await.unwrap_err();

        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(
            control(&view, "u1"),
            MemberControl::Teams(vec![LOADING_NAME.to_string()])
        );
    }

    #[tokio::test]
    async fn invite_refreshes_the_row() {
        let api = FakeApi::new().with_team("t-alpha", "Alpha");
        let mut view = TeamMembersView::new("t-alpha", vec![user("u1", "Ann")]);
        view.load(&api).await.unwrap();
        assert_eq!(control(&view, "u1"), MemberControl::Invite);

        view.invite(&api, "u1").await.unwrap();

        assert_eq!(
            control(&view, "u1"),
            MemberControl::Teams(vec!["Alpha".to_string()])
        );
    }

    #[test]
    fn search_matches_first_name_only() {
        let mut view = TeamMembersView::new(
            "t1",
            vec![user("u1", "Annabel"), user("u2", "Bob"), user("u3", "JOANNA")],
        );

        view.set_search("ann");
        let ids: Vec<String> = view.rows().into_iter().map(|r| r.user_id).collect();
        assert_eq!(ids, vec!["u1", "u3"]);

        view.set_search("Tester");
        assert!(view.rows().is_empty());

        view.set_search("");
        assert_eq!(view.rows().len(), 3);
    }
}
