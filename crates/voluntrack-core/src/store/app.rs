use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::api::{ApiClient, Notifier};
use crate::auth::{AuthStore, SessionHandle, TokenStore};
use crate::config::Config;
use crate::router::{self, Navigation};

/// Application state: the gateway plus the auth and activity stores built
/// on top of it. Constructed once and passed to whatever needs it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub auth: AuthStore,
    pub activities: super::ActivityStore,
}

impl AppState {
    /// Build the state from loaded configuration.
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        Self::new(
            &config.api_base_url(),
            config.request_timeout(),
            config.token_store()?,
            notifier,
        )
    }

    pub fn new(
        base_url: &str,
        timeout: Duration,
        token_store: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = SessionHandle::restore(token_store);
        let api = ApiClient::new(base_url, timeout, session, notifier)?;
        info!(base_url = api.base_url(), "Application state initialized");

        Ok(Self {
            auth: AuthStore::new(api.clone()),
            activities: super::ActivityStore::new(api.clone()),
            api,
        })
    }

    /// Decide whether navigation to `path` may proceed for the current session.
    pub fn navigate(&self, path: &str) -> Navigation {
        router::before_each(path, self.auth.is_logged_in())
    }
}
