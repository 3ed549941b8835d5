//! Default values and environment keys.

pub const DEFAULT_BASE_URL: &str = "http://localhost:7201";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_LOGIN_PATH: &str = "/Auth/login";
pub const DEFAULT_FORGOT_PASSWORD_PATH: &str = "/Auth/forgot-password";
pub const DEFAULT_RESET_WITH_TOKEN_PATH: &str =
    "/Auth/reset-password-with-reset-token";
pub const DEFAULT_RESET_PASSWORD_PATH: &str = "/Auth/reset-password";
pub const DEFAULT_USERS_PATH: &str = "/users";

/// Directory name under the platform config dir.
pub const APP_DIR: &str = "userdesk";
pub const CONFIG_FILE: &str = "config.toml";

pub const ENV_API_URL: &str = "USERDESK_API_URL";
pub const ENV_LOGIN_PATH: &str = "USERDESK_LOGIN_PATH";
pub const ENV_TIMEOUT_SECS: &str = "USERDESK_TIMEOUT_SECS";
pub const ENV_STATE_DIR: &str = "USERDESK_STATE_DIR";
