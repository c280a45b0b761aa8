//! Client configuration

use crate::client::ClientError;
use crate::storage::MalformedAuthPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Suffix appended to the backend origin
pub const API_PATH: &str = "/api";

/// Environment variable prefix for [`ClientSettings`]
pub const ENV_PREFIX: &str = "ECOM";

/// Resolved configuration of an [`ApiClient`](super::ApiClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `<origin>/api`
    pub base_url: String,
    /// Send cookies and other credentials with every request
    pub with_credentials: bool,
}

impl ClientConfig {
    /// Derive the configuration from a backend origin
    ///
    /// The origin is not validated. A missing origin leaves the origin
    /// segment empty, so requests go to `/api/...` and fail when sent.
    pub fn from_origin(origin: Option<&str>) -> Self {
        Self {
            base_url: format!("{}{API_PATH}", origin.unwrap_or_default()),
            with_credentials: true,
        }
    }
}

/// Settings loaded from the environment or a settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Backend origin, e.g. `https://api.example.com`
    #[serde(default)]
    pub back_end_url: Option<String>,

    /// Request timeout in seconds (ignored on wasm32)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Handling of a stored login record that does not parse
    #[serde(default)]
    pub malformed_auth: MalformedAuthPolicy,

    /// Directory holding the persisted local storage file
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

impl ClientSettings {
    /// Load settings from `ECOM_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load settings from file, overridden by `ECOM_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(env_source(config::Environment::with_prefix(ENV_PREFIX)))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    fn from_environment(environment: config::Environment) -> Result<Self, ClientError> {
        let settings = config::Config::builder()
            .add_source(env_source(environment))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Client configuration derived from these settings
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::from_origin(self.back_end_url.as_deref())
    }

    /// Directory for persisted state: explicit setting, else the platform data dir
    pub fn resolved_state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }
}

fn env_source(environment: config::Environment) -> config::Environment {
    environment.try_parsing(true)
}

/// `<data dir>/ecom`, falling back to the working directory
pub fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ecom")
}
