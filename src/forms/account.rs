//! Account settings form with the avatar editor.

use super::SubmitError;
use crate::client::{ClientError, LearningApi};
use crate::config::AssetUrlResolver;
use crate::models::{UpdateUserRequest, User};
use crate::validation::{FieldErrors, ACCOUNT_SCHEMA};

/// A locally selected image that has not been uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub file_name: String,
    /// In-memory preview, e.g. an object or data URL.
    pub preview_url: String,
}

/// What the avatar slot shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarDisplay {
    Preview(String),
    Remote(String),
    Placeholder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvatarEditor {
    pending: Option<PendingFile>,
}

impl AvatarEditor {
    pub fn select(&mut self, file: PendingFile) {
        self.pending = Some(file);
    }

    pub fn pending(&self) -> Option<&PendingFile> {
        self.pending.as_ref()
    }

    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// A pending file wins over the persisted URL.
    pub fn display(&self, persisted: Option<&str>, resolver: &AssetUrlResolver) -> AvatarDisplay {
        if let Some(file) = &self.pending {
            return AvatarDisplay::Preview(file.preview_url.clone());
        }
        persisted
            .and_then(|p| resolver.resolve(p))
            .map(AvatarDisplay::Remote)
            .unwrap_or(AvatarDisplay::Placeholder)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountForm {
    user_id: String,
    pub first_name: String,
    pub last_name: String,
    avatar_url: Option<String>,
    saved_avatar_url: Option<String>,
    pub avatar: AvatarEditor,
    field_errors: FieldErrors,
    error: Option<String>,
}

impl AccountForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar_url: user.avatar_url.clone(),
            saved_avatar_url: user.avatar_url.clone(),
            avatar: AvatarEditor::default(),
            field_errors: FieldErrors::new(),
            error: None,
        }
    }

    /// The avatar URL the form will submit.
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Clear the avatar in the form values only; the stored record changes
    /// on submit.
    pub fn delete_avatar(&mut self) {
        self.avatar_url = None;
        self.avatar.clear_pending();
    }

    pub fn avatar_display(&self, resolver: &AssetUrlResolver) -> AvatarDisplay {
        self.avatar.display(self.avatar_url.as_deref(), resolver)
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

    fn request(&self) -> UpdateUserRequest {
        UpdateUserRequest {
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            avatar_url: (self.avatar_url != self.saved_avatar_url).then(|| self.avatar_url.clone()),
        }
    }

    pub async fn submit(&mut self, api: &dyn LearningApi) -> Result<User, SubmitError> {
        let request = self.request();
        if let Err(fields) = ACCOUNT_SCHEMA.validate(&request) {
            self.field_errors = fields.clone();
            return Err(SubmitError::Validation(fields));
        }
        self.field_errors = FieldErrors::new();

        match api.update_user(&self.user_id, &request).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "account updated");
                *self = Self::from_user(&user);
                Ok(user)
            }
            Err(ClientError::Validation(fields)) => {
                self.field_errors = fields.clone();
                Err(SubmitError::Validation(fields))
            }
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, "updating account failed: {}", e);
                self.error = Some(format!("Could not save account: {}", e));
                Err(SubmitError::Api(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{Call, FakeApi};

    fn resolver() -> AssetUrlResolver {
        AssetUrlResolver::new(url::Url::parse("https://cdn.example.com/assets").unwrap())
    }

    fn user() -> User {
        User {
            id: "u1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            avatar_url: Some("avatars/u1.png".to_string()),
            role_id: None,
            team_id: None,
            email: None,
            roles: Vec::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn pending_file_takes_display_priority() {
        let mut form = AccountForm::from_user(&user());
        assert_eq!(
            form.avatar_display(&resolver()),
            AvatarDisplay::Remote("https://cdn.example.com/assets/avatars/u1.png".to_string())
        );

        form.avatar.select(PendingFile {
            file_name: "me.png".to_string(),
            preview_url: "blob:local/1".to_string(),
        });
        assert_eq!(
            form.avatar_display(&resolver()),
            AvatarDisplay::Preview("blob:local/1".to_string())
        );
    }

    #[tokio::test]
    async fn delete_only_touches_form_until_submit() {
        let api = FakeApi::new().with_user(user());
        let mut form = AccountForm::from_user(&user());

        form.delete_avatar();

        assert_eq!(form.avatar_url(), None);
        assert_eq!(form.avatar_display(&resolver()), AvatarDisplay::Placeholder);
        assert!(api.calls().is_empty());

        let saved = form.submit(&api).await.unwrap();
        assert_eq!(saved.avatar_url, None);
        let Some(Call::UpdateUser(_, request)) = api.calls().pop() else {
            panic!("expected update_user");
        };
        assert_eq!(request.avatar_url, Some(None));
    }

    #[tokio::test]
    async fn unchanged_avatar_is_not_sent() {
        let api = FakeApi::new().with_user(user());
        let mut form = AccountForm::from_user(&user());
        form.first_name = "Augusta".to_string();

        let saved = form.submit(&api).await.unwrap();

        assert_eq!(saved.first_name, "Augusta");
        assert_eq!(saved.avatar_url.as_deref(), Some("avatars/u1.png"));
        let Some(Call::UpdateUser(_, request)) = api.calls().pop() else {
            panic!("expected update_user");
        };
        assert_eq!(request.avatar_url, None);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_locally() {
        let api = FakeApi::new().with_user(user());
        let mut form = AccountForm::from_user(&user());
        form.last_name = " ".to_string();

        let err = form.submit(&api).await.unwrap_err();

        assert!(matches!(err, SubmitError::Validation(ref f) if f.get("lastName").is_some()));
        assert!(api.calls().is_empty());
    }
}
