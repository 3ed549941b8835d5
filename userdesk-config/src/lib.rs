//! Shared configuration library for userdesk.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `.env`/process environment, then explicit overrides from the caller
//! (usually CLI flags). The result is validated once and handed to the
//! client as a plain [`Config`].

pub mod constants;
pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError,
};
pub use models::{
    ApiConfig, Config, ConfigMetadata, Endpoints, SessionConfig,
};
pub use validation::normalize_base_url;
