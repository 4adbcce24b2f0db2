//! Configuration management for the Telegram driver
//!
//! Values resolve in the order environment > TOML file > default.

pub mod file;

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use self::file::DriverConfigFile;
use crate::driver::outbound::{API_BASE, FILE_API_BASE};
use crate::{Error, Result};

/// Default webhook server port
pub const DEFAULT_PORT: u16 = 8443;

/// Default webhook server bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Driver runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Values the driver core reads
    pub driver: DriverConfig,

    /// Webhook handling options
    pub webhook: WebhookConfig,

    /// Webhook server binding
    pub server: ServerConfig,
}

/// Configuration handed to the driver at construction
///
/// Read-only; the driver never mutates it.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Bot API token
    pub token: SecretString,

    /// Bot API base URL, `https://api.telegram.org/bot` unless overridden
    pub api_base: String,

    /// File download base URL, `https://api.telegram.org/file/bot` unless overridden
    pub file_api_base: String,
}

impl DriverConfig {
    /// Config for the public Bot API with the given token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            api_base: API_BASE.to_string(),
            file_api_base: FILE_API_BASE.to_string(),
        }
    }

    /// Point API calls at another Bot API server
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// The token in clear text, for URL building only
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// Webhook handling options
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Expected `X-Telegram-Bot-Api-Secret-Token` header value
    pub secret: Option<String>,

    /// Log raw webhook bodies at debug level
    pub debug_updates: bool,

    /// Send a typing indicator for every forwarded message
    pub typing_indicator: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            debug_updates: false,
            typing_indicator: true,
        }
    }
}

/// Webhook server binding
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load from the process environment and the default config file
    ///
    /// # Errors
    ///
    /// Returns error if no bot token is configured
    pub fn load() -> Result<Self> {
        Self::from_sources(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Load from the process environment and an explicit config file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be loaded or no bot token is configured
    pub fn load_from(path: &Path) -> Result<Self> {
        let fc = file::load_config_file_from(path)?;
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if no bot token is configured
    pub fn from_sources(fc: DriverConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = env("TELEGRAM_BOT_TOKEN")
            .or(fc.telegram.token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("telegram token not set (TELEGRAM_BOT_TOKEN or [telegram] token)".to_string())
            })?;

        let driver = DriverConfig {
            token: SecretString::from(token),
            api_base: env("TELEGRAM_API_BASE")
                .or(fc.telegram.api_base)
                .unwrap_or_else(|| API_BASE.to_string()),
            file_api_base: env("TELEGRAM_FILE_API_BASE")
                .or(fc.telegram.file_api_base)
                .unwrap_or_else(|| FILE_API_BASE.to_string()),
        };

        let webhook = WebhookConfig {
            secret: env("TELEGRAM_WEBHOOK_SECRET")
                .or(fc.telegram.webhook_secret)
                .filter(|s| !s.is_empty()),
            debug_updates: env("TELEGRAM_DEBUG_UPDATES")
                .map(|v| parse_flag(&v))
                .or(fc.telegram.debug_updates)
                .unwrap_or(false),
            typing_indicator: env("TELEGRAM_TYPING_INDICATOR")
                .map(|v| parse_flag(&v))
                .or(fc.telegram.typing_indicator)
                .unwrap_or(true),
        };

        let server = ServerConfig {
            host: env("DRIVER_HOST")
                .or(fc.server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: env("DRIVER_PORT")
                .or_else(|| env("PORT"))
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            driver,
            webhook,
            server,
        })
    }
}

/// Interpret an environment flag (`1`, `true`, `yes`, `on`)
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
