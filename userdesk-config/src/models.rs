use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::*;

/// Fully resolved console configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub endpoints: Endpoints,
    pub session: SessionConfig,
    #[serde(skip)]
    pub metadata: ConfigMetadata,
}

/// Remote API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Path table for every remote operation.
///
/// Deployments disagree on casing (`/Auth/login` vs `/auth/authenticate`),
/// so every path is configuration rather than a constant in the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub login: String,
    pub forgot_password: String,
    pub reset_with_token: String,
    pub reset_password: String,
    /// Collection path; item paths are `{users}/{id}`.
    pub users: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_PATH.to_string(),
            forgot_password: DEFAULT_FORGOT_PASSWORD_PATH.to_string(),
            reset_with_token: DEFAULT_RESET_WITH_TOKEN_PATH.to_string(),
            reset_password: DEFAULT_RESET_PASSWORD_PATH.to_string(),
            users: DEFAULT_USERS_PATH.to_string(),
        }
    }
}

impl Endpoints {
    pub fn user_item(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{}", self.users.trim_end_matches('/'), id)
    }
}

/// Where the persisted session lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Override for the session state directory. `None` uses the platform
    /// data directory.
    pub state_dir: Option<PathBuf>,
}

/// Provenance of the loaded configuration, for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigMetadata {
    pub config_file: Option<PathBuf>,
    pub env_file_loaded: bool,
}
