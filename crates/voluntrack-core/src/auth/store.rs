use tracing::{debug, info};

use super::{Session, SessionHandle};
use crate::api::{ApiClient, ApiResult};
use crate::models::{Credentials, NewUser, ProfileUpdate, Role, UserProfile, UserStatistics};

/// Login state operations. Every mutation of the session outside the
/// gateway's forced logout goes through here.
#[derive(Debug, Clone)]
pub struct AuthStore {
    api: ApiClient,
    session: SessionHandle,
}

impl AuthStore {
    pub fn new(api: ApiClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    /// Log in and keep the returned token and profile.
    /// The session is left untouched when the request fails.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<UserProfile> {
        let response = self.api.login(credentials).await?;
        self.session
            .establish(response.access_token, response.user.clone());
        info!(user_id = response.user.id, "Login successful");
        Ok(response.user)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, user: &NewUser) -> ApiResult<UserProfile> {
        self.api.register(user).await
    }

    /// Validate a saved token by fetching the profile.
    ///
    /// Without a token this is a no-op. Any failure resets the session to
    /// logged out; the failure itself is not reported to the caller.
    pub async fn check_auth(&self) {
        if !self.session.has_token() {
            return;
        }

        match self.api.fetch_profile().await {
            Ok(user) => {
                debug!(user_id = user.id, "Saved token is valid");
                self.session.validate(user);
            }
            Err(e) => {
                debug!(error = %e, "Saved token rejected, logging out");
                self.session.clear();
            }
        }
    }

    /// Send profile changes and keep the profile the server returns.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        let user = self.api.update_profile(update).await?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    /// Forget the session locally. No request is made.
    pub fn logout(&self) {
        self.session.clear();
        info!("Logged out");
    }

    pub async fn fetch_statistics(&self) -> ApiResult<UserStatistics> {
        self.api.fetch_statistics().await
    }

    // ===== Getters =====

    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session.user()
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.session.user_id()
    }

    pub fn user_role(&self) -> Option<Role> {
        self.session.user_role()
    }
}
