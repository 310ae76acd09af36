use crate::errors::AppResult;
use crate::models::{ProfilePatch, Session};
use crate::store::LocalStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Simulated network latency on login/signup, matching the reference demo.
pub const AUTH_DELAY: Duration = Duration::from_millis(1000);

/// Demo authentication: any credentials succeed, the session is fabricated
/// locally and persisted to the store. The only failure paths are storage
/// errors, never credential rejection.
#[derive(Debug, Clone)]
pub struct AuthService {
    store: Arc<LocalStore>,
    delay: Duration,
}

impl AuthService {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self::with_delay(store, AUTH_DELAY)
    }

    pub fn with_delay(store: Arc<LocalStore>, delay: Duration) -> Self {
        Self { store, delay }
    }

    pub async fn login(&self, email: &str, _password: &str) -> AppResult<Session> {
        tokio::time::sleep(self.delay).await;
        let session = fabricate_session(&display_name_from_email(email), email);
        self.store.save_session(&session)?;
        tracing::info!(user_id = %session.id, "login");
        Ok(session)
    }

    pub async fn signup(&self, name: &str, email: &str, _password: &str) -> AppResult<Session> {
        tokio::time::sleep(self.delay).await;
        let session = fabricate_session(name, email);
        self.store.save_session(&session)?;
        tracing::info!(user_id = %session.id, "signup");
        Ok(session)
    }

    pub fn logout(&self) -> AppResult<()> {
        self.store.clear_session()
    }

    /// Merges the given fields into the current session, if any. Without a
    /// session this is a no-op returning `None`.
    pub fn update_profile(&self, patch: ProfilePatch) -> AppResult<Option<Session>> {
        let Some(mut session) = self.store.load_session()? else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            session.name = name;
        }
        if let Some(email) = patch.email {
            session.email = email;
        }
        if patch.avatar.is_some() {
            session.avatar = patch.avatar;
        }
        if patch.bio.is_some() {
            session.bio = patch.bio;
        }
        if patch.company.is_some() {
            session.company = patch.company;
        }
        if patch.location.is_some() {
            session.location = patch.location;
        }
        self.store.save_session(&session)?;
        Ok(Some(session))
    }

    pub fn current(&self) -> AppResult<Option<Session>> {
        self.store.load_session()
    }
}

fn fabricate_session(name: &str, email: &str) -> Session {
    Session {
        id: format!("user-{}", Utc::now().timestamp_millis()),
        name: name.to_string(),
        email: email.to_string(),
        avatar: None,
        bio: None,
        company: None,
        location: None,
        created_at: Utc::now().to_rfc3339(),
    }
}

/// "alice@example.com" -> "Alice", per the reference login flow.
fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &tempfile::TempDir) -> AuthService {
        let store = Arc::new(LocalStore::open(&dir.path().join("gridblock.db")).expect("store"));
        AuthService::with_delay(store, Duration::ZERO)
    }

    #[tokio::test]
    async fn login_accepts_any_credentials_and_persists_the_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let auth = service(&dir);

        let session = auth.login("alice@example.com", "whatever").await.expect("login");
        assert_eq!(session.name, "Alice");
        assert_eq!(session.email, "alice@example.com");
        assert!(session.id.starts_with("user-"));

        let restored = auth.current().expect("current").expect("session present");
        assert_eq!(restored.id, session.id);
    }

    #[tokio::test]
    async fn signup_uses_the_provided_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let auth = service(&dir);

        let session = auth
            .signup("Bob Builder", "bob@example.com", "pw")
            .await
            .expect("signup");
        assert_eq!(session.name, "Bob Builder");
    }

    #[tokio::test]
    async fn logout_clears_the_session_immediately() {
        let dir = tempfile::tempdir().expect("tempdir");
        let auth = service(&dir);

        auth.login("alice@example.com", "pw").await.expect("login");
        auth.logout().expect("logout");
        assert!(auth.current().expect("current").is_none());
    }

    #[tokio::test]
    async fn update_profile_merges_fields_or_does_nothing_when_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let auth = service(&dir);

        let patch = ProfilePatch {
            bio: Some("Hello".to_string()),
            ..ProfilePatch::default()
        };
        assert!(auth.update_profile(patch.clone()).expect("no-op").is_none());

        auth.login("alice@example.com", "pw").await.expect("login");
        let updated = auth
            .update_profile(patch)
            .expect("update")
            .expect("session present");
        assert_eq!(updated.bio.as_deref(), Some("Hello"));
        assert_eq!(updated.name, "Alice");
    }
}
