use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::TokenStore;
use crate::models::{Role, UserProfile};

/// Current authentication status.
///
/// `is_logged_in` is only set once the token has been validated by a
/// successful login or profile fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub is_logged_in: bool,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn user_role(&self) -> Option<&Role> {
        self.user.as_ref().map(|u| &u.role)
    }
}

/// Shared handle to the session, paired with the store that persists its
/// token. Clone is cheap; all clones see the same session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
    store: Arc<dyn TokenStore>,
}

impl SessionHandle {
    /// Build a session from whatever token the store holds. The session
    /// starts logged out; call `AuthStore::check_auth` to validate it.
    pub fn restore(store: Arc<dyn TokenStore>) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to load saved token");
                None
            }
        };
        debug!(has_token = token.is_some(), "Session restored");
        Self {
            inner: Arc::new(RwLock::new(Session {
                token,
                ..Default::default()
            })),
            store,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn has_token(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().is_logged_in
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.read().user_id()
    }

    pub fn user_role(&self) -> Option<Role> {
        self.read().user_role().cloned()
    }

    /// Record a fresh login: token persisted, profile stored, logged in.
    pub(crate) fn establish(&self, token: String, user: UserProfile) {
        self.persist(Some(&token));
        let mut session = self.write();
        session.token = Some(token);
        session.user = Some(user);
        session.is_logged_in = true;
    }

    /// Mark the stored token as validated by a profile fetch.
    pub(crate) fn validate(&self, user: UserProfile) {
        let mut session = self.write();
        session.user = Some(user);
        session.is_logged_in = true;
    }

    pub(crate) fn set_user(&self, user: UserProfile) {
        self.write().user = Some(user);
    }

    /// Drop token, profile and login flag, including the persisted token.
    pub fn clear(&self) {
        self.persist(None);
        *self.write() = Session::default();
    }

    fn persist(&self, token: Option<&str>) {
        let result = match token {
            Some(token) => self.store.save(token),
            None => self.store.clear(),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist token");
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.read();
        f.debug_struct("SessionHandle")
            .field("has_token", &session.token.is_some())
            .field("is_logged_in", &session.is_logged_in)
            .field("user_id", &session.user_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn profile(id: i64) -> UserProfile {
        serde_json::from_value(serde_json::json!({"id": id, "username": "u", "role": "admin"}))
            .unwrap()
    }

    #[test]
    fn test_restore_reads_token_but_stays_logged_out() {
        let store = Arc::new(MemoryTokenStore::with_token("saved"));
        let session = SessionHandle::restore(store);
        assert_eq!(session.token().as_deref(), Some("saved"));
        assert!(!session.is_logged_in());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_establish_persists_and_clear_removes() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = SessionHandle::restore(store.clone());

        session.establish("tok".to_string(), profile(5));
        assert!(session.is_logged_in());
        assert_eq!(session.user_id(), Some(5));
        assert_eq!(session.user_role(), Some(Role::Admin));
        assert_eq!(store.peek().as_deref(), Some("tok"));

        session.clear();
        assert_eq!(session.snapshot(), Session::default());
        assert_eq!(store.peek(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionHandle::restore(Arc::new(MemoryTokenStore::new()));
        let other = session.clone();
        session.establish("tok".to_string(), profile(1));
        assert!(other.is_logged_in());
        other.clear();
        assert!(!session.has_token());
    }
}
