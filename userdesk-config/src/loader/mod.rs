pub mod error;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::constants::*;
use crate::models::Config;
use crate::validation;
use error::ConfigLoadError;

/// Caller-supplied knobs, usually mapped straight from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoaderOptions {
    /// Explicit config file. A missing explicit file is an error; the
    /// implicit platform path is optional.
    pub config_path: Option<PathBuf>,
    /// `.env` file to read before consulting the process environment.
    pub env_file: Option<PathBuf>,
    pub api_url: Option<String>,
    pub state_dir: Option<PathBuf>,
}

/// Result of a load: the validated config plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    /// Load using the real process environment.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file = self.read_env_file()?;
        let env_file_loaded = env_file.is_some();
        let mut env = env_file.unwrap_or_default();
        // Process environment wins over the .env file.
        env.extend(std::env::vars());
        let mut load = self.load_with_env(&env)?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Load against an explicit environment map. Used by [`Self::load`] and
    /// by tests that must not touch process state.
    pub fn load_with_env(
        &self,
        env: &HashMap<String, String>,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut config = match self.resolve_config_path() {
            Some((path, required)) => match read_config_file(&path, required)? {
                Some(mut config) => {
                    info!("loaded config file {}", path.display());
                    config.metadata.config_file = Some(path);
                    config
                }
                None => Config::default(),
            },
            None => Config::default(),
        };

        apply_env(&mut config, env)?;

        if let Some(url) = &self.options.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(dir) = &self.options.state_dir {
            config.session.state_dir = Some(dir.clone());
        }

        validation::validate(&mut config)?;
        debug!(base_url = %config.api.base_url, "configuration resolved");
        Ok(ConfigLoad { config })
    }

    fn resolve_config_path(&self) -> Option<(PathBuf, bool)> {
        if let Some(path) = &self.options.config_path {
            return Some((path.clone(), true));
        }
        dirs::config_dir()
            .map(|dir| (dir.join(APP_DIR).join(CONFIG_FILE), false))
    }

    /// Entries of the configured `.env` file, or `None` when no file was
    /// read. An existing but empty file still counts as read.
    pub fn read_env_file(
        &self,
    ) -> Result<Option<HashMap<String, String>>, ConfigLoadError> {
        let Some(path) = &self.options.env_file else {
            return Ok(None);
        };
        if !path.exists() {
            debug!("no env file at {}", path.display());
            return Ok(None);
        }
        let mut map = HashMap::new();
        for item in dotenvy::from_path_iter(path)? {
            let (key, value) = item?;
            map.insert(key, value);
        }
        debug!(entries = map.len(), "read env file {}", path.display());
        Ok(Some(map))
    }
}

fn read_config_file(
    path: &Path,
    required: bool,
) -> Result<Option<Config>, ConfigLoadError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigLoadError::ReadFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigLoadError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
}

fn apply_env(
    config: &mut Config,
    env: &HashMap<String, String>,
) -> Result<(), ConfigLoadError> {
    let get = |key: &str| {
        env.get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    if let Some(url) = get(ENV_API_URL) {
        config.api.base_url = url.to_string();
    }
    if let Some(path) = get(ENV_LOGIN_PATH) {
        config.endpoints.login = path.to_string();
    }
    if let Some(raw) = get(ENV_TIMEOUT_SECS) {
        config.api.timeout_secs =
            raw.parse().map_err(|_| ConfigLoadError::InvalidEnvValue {
                key: ENV_TIMEOUT_SECS,
                value: raw.to_string(),
            })?;
    }
    if let Some(dir) = get(ENV_STATE_DIR) {
        config.session.state_dir = Some(PathBuf::from(dir));
    }
    Ok(())
}
