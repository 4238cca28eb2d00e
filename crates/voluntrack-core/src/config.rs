//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! API base URL, request timeout, where the access token is kept and the
//! last used username.
//!
//! Configuration is stored at `~/.config/voluntrack/config.json`. The
//! environment variables `VOLUNTRACK_API_URL` and `VOLUNTRACK_TIMEOUT_SECS`
//! take precedence over the file. Loading a `.env` file is left to the
//! binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "voluntrack";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "VOLUNTRACK_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "VOLUNTRACK_TIMEOUT_SECS";

/// Where the access token is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub token_storage: TokenStorage,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Effective API base URL: environment, then file, then default.
    pub fn api_base_url(&self) -> String {
        std::env::var(ENV_API_URL)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Effective request timeout: environment, then file, then default.
    /// Zero or unparsable values are skipped at each level.
    pub fn request_timeout(&self) -> Duration {
        let secs = std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&s| s > 0)
            .or(self.request_timeout_secs.filter(|&s| s > 0))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn token_store(&self) -> Result<Arc<dyn TokenStore>> {
        Ok(match self.token_storage {
            TokenStorage::File => Arc::new(FileTokenStore::new(self.cache_dir()?)),
            TokenStorage::Keyring => Arc::new(KeyringTokenStore),
            TokenStorage::Memory => Arc::new(MemoryTokenStore::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    // Tests that touch the process environment take this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_TIMEOUT_SECS);
        guard
    }

    fn with_file_values(url: Option<&str>, timeout: Option<u64>) -> Config {
        Config {
            api_base_url: url.map(str::to_string),
            request_timeout_secs: timeout,
            ..Default::default()
        }
    }

    #[test]
    fn test_api_base_url_precedence() {
        let _env = env_guard();
        let file = with_file_values(Some("https://file.example.org/api"), None);

        assert_eq!(Config::default().api_base_url(), DEFAULT_BASE_URL);
        assert_eq!(file.api_base_url(), "https://file.example.org/api");

        std::env::set_var(ENV_API_URL, "https://env.example.org/api");
        assert_eq!(file.api_base_url(), "https://env.example.org/api");
        assert_eq!(Config::default().api_base_url(), "https://env.example.org/api");

        // Blank values count as unset
        std::env::set_var(ENV_API_URL, "  ");
        assert_eq!(file.api_base_url(), "https://file.example.org/api");

        std::env::remove_var(ENV_API_URL);
    }

    #[test]
    fn test_request_timeout_precedence() {
        let _env = env_guard();
        let file = with_file_values(None, Some(30));

        assert_eq!(
            Config::default().request_timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert_eq!(file.request_timeout(), Duration::from_secs(30));

        std::env::set_var(ENV_TIMEOUT_SECS, " 5 ");
        assert_eq!(file.request_timeout(), Duration::from_secs(5));

        std::env::remove_var(ENV_TIMEOUT_SECS);
    }

    #[test]
    fn test_zero_timeout_falls_through() {
        let _env = env_guard();

        std::env::set_var(ENV_TIMEOUT_SECS, "0");
        assert_eq!(
            with_file_values(None, Some(30)).request_timeout(),
            Duration::from_secs(30)
        );
        assert_eq!(
            with_file_values(None, Some(0)).request_timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );

        std::env::set_var(ENV_TIMEOUT_SECS, "soon");
        assert_eq!(
            with_file_values(None, Some(30)).request_timeout(),
            Duration::from_secs(30)
        );

        std::env::remove_var(ENV_TIMEOUT_SECS);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"api_base_url": "https://vol.example.org/api"}"#).unwrap();
        assert_eq!(config.token_storage, TokenStorage::File);
        assert_eq!(config.request_timeout_secs, None);
        assert!(config.last_username.is_none());
    }

    #[test]
    fn test_token_storage_names() {
        let config: Config = serde_json::from_str(r#"{"token_storage": "keyring"}"#).unwrap();
        assert_eq!(config.token_storage, TokenStorage::Keyring);
        assert_eq!(
            serde_json::to_string(&TokenStorage::Memory).unwrap(),
            r#""memory""#
        );
    }

    #[test]
    fn test_memory_token_store_from_config() {
        let config = Config {
            token_storage: TokenStorage::Memory,
            ..Default::default()
        };
        let store = config.token_store().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
