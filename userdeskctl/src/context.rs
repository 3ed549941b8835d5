//! Wiring from resolved configuration to client objects.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use userdesk_client::{
    ApiClient, AuthGateway, FileKeyValueStore, ReqwestTransport, SessionStore,
    UserDirectory,
};
use userdesk_config::{Config, ConfigLoader, ConfigLoaderOptions};

/// One invocation's worth of client state.
#[derive(Debug)]
pub struct Console {
    pub config: Config,
    pub session: SessionStore,
    pub gateway: AuthGateway,
    pub users: UserDirectory,
}

#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub api_url: Option<String>,
    pub state_dir: Option<PathBuf>,
}

impl Console {
    pub fn open(options: &GlobalOptions) -> Result<Self> {
        let load = ConfigLoader::new(ConfigLoaderOptions {
            config_path: options.config.clone(),
            env_file: options.env_file.clone(),
            api_url: options.api_url.clone(),
            state_dir: options.state_dir.clone(),
        })
        .load()
        .context("failed to load configuration")?;
        let config = load.config;

        let store = match &config.session.state_dir {
            Some(dir) => FileKeyValueStore::in_dir(dir),
            None => FileKeyValueStore::platform_default()
                .context("failed to locate session storage")?,
        };
        debug!(path = %store.path().display(), "session storage");

        let session = SessionStore::new(Arc::new(store));
        // An unreadable session file must not block `logout` or `login`.
        if let Err(err) = session.restore() {
            warn!("ignoring unreadable saved session: {err}");
        }

        let transport = ReqwestTransport::new(config.api.timeout())
            .context("failed to build HTTP client")?;
        let api = ApiClient::new(Arc::new(transport), &config, session.clone());

        Ok(Self {
            gateway: AuthGateway::new(api.clone()),
            users: UserDirectory::new(api),
            session,
            config,
        })
    }
}
