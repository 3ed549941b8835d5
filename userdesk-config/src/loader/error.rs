use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("API base URL is empty")]
    EmptyBaseUrl,
    #[error("invalid API base URL '{value}'")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base URL '{value}' must use http or https, not '{scheme}'")]
    UnsupportedScheme { value: String, scheme: String },
    #[error("invalid endpoint `{name}` = '{value}': {reason}")]
    InvalidEndpoint {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("request timeout must be greater than zero")]
    InvalidTimeout,
    #[error("invalid value for {key}: '{value}'")]
    InvalidEnvValue { key: &'static str, value: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
