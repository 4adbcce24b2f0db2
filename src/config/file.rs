//! TOML configuration file loading
//!
//! Supports `~/.config/telegram-driver/config.toml` as a persistent config
//! source. All fields are optional; the file is a partial overlay on top of
//! defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct DriverConfigFile {
    /// Telegram driver settings
    #[serde(default)]
    pub telegram: TelegramFileConfig,

    /// Webhook server settings
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// `[telegram]` section
#[derive(Debug, Default, Deserialize)]
pub struct TelegramFileConfig {
    /// Bot API token
    pub token: Option<String>,

    /// Bot API base URL (token and endpoint are appended)
    pub api_base: Option<String>,

    /// File download base URL
    pub file_api_base: Option<String>,

    /// Expected `X-Telegram-Bot-Api-Secret-Token` header value
    pub webhook_secret: Option<String>,

    /// Log raw webhook bodies at debug level
    pub debug_updates: Option<bool>,

    /// Send a typing indicator for every forwarded message
    pub typing_indicator: Option<bool>,
}

/// `[server]` section
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Bind address
    pub host: Option<String>,

    /// Listen port
    pub port: Option<u16>,
}

/// Load the TOML config file from the standard path
///
/// Returns `DriverConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> DriverConfigFile {
    let Some(path) = config_file_path() else {
        return DriverConfigFile::default();
    };

    if !path.exists() {
        return DriverConfigFile::default();
    }

    match load_config_file_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            DriverConfigFile::default()
        }
    }
}

/// Load a TOML config file from an explicit path
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn load_config_file_from(path: &Path) -> Result<DriverConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/telegram-driver/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("telegram-driver").join("config.toml"))
}
