//! CLI configuration utilities

use anyhow::{Context, Result};
use ecom_http::ClientSettings;
use ecom_http::client::config::default_state_dir;
use std::path::{Path, PathBuf};

/// Settings file looked up in the data directory when `--config` is not given
pub const SETTINGS_FILE: &str = "ecom.toml";

/// Load settings and apply command-line overrides
///
/// Reads `path` if given, else `<data dir>/ecom.toml` if it exists, else the
/// environment alone.
pub fn load_settings(
    path: Option<&Path>,
    back_end_url: Option<String>,
    data_dir: Option<PathBuf>,
) -> Result<ClientSettings> {
    let default_path = data_dir
        .clone()
        .unwrap_or_else(default_state_dir)
        .join(SETTINGS_FILE);
    let path = path.or_else(|| default_path.is_file().then_some(default_path.as_path()));

    let mut settings = match path {
        Some(path) => ClientSettings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ClientSettings::from_env().context("Failed to load settings from environment")?,
    };

    if back_end_url.is_some() {
        settings.back_end_url = back_end_url;
    }
    if data_dir.is_some() {
        settings.state_dir = data_dir;
    }

    Ok(settings)
}

/// Write a settings file with default values
pub fn generate_default_settings<P: AsRef<Path>>(path: P) -> Result<()> {
    let settings = ClientSettings {
        back_end_url: Some("http://localhost:8080".to_string()),
        timeout_secs: Some(30),
        ..ClientSettings::default()
    };
    save_settings(&settings, path)
}

/// Save settings as TOML
pub fn save_settings<P: AsRef<Path>>(settings: &ClientSettings, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}
