use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::provider::{MediaProviderConfig, SupportPolicy};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub support: SupportPolicy,
    /// Defaults for `load_media` calls; command-line flags override them
    pub media: MediaProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// Transport timeouts. The resolution core owns no deadline of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_seconds: u64,
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 10,
            timeout_seconds: 30,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // OTTKIT_HTTP__TIMEOUT_SECONDS, OTTKIT_MEDIA__BASE_URL, ...
        builder = builder.add_source(
            Environment::with_prefix("OTTKIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Human-readable problems that would make the configuration unusable
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if crate::logging::parse_log_level(&self.logging.level).is_err() {
            problems.push(format!("logging.level: unknown level '{}'", self.logging.level));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            problems.push(format!(
                "logging.format: expected 'json' or 'pretty', got '{}'",
                self.logging.format
            ));
        }
        if self.http.connect_timeout_seconds == 0 {
            problems.push("http.connect_timeout_seconds must be greater than 0".to_string());
        }
        if self.http.timeout_seconds == 0 {
            problems.push("http.timeout_seconds must be greater than 0".to_string());
        }
        if self.support.formats.is_empty() {
            problems.push("support.formats must list at least one format".to_string());
        }
        if let Some(base_url) = self.media.base_url.as_deref() {
            if url::Url::parse(base_url).is_err() {
                problems.push(format!("media.base_url: invalid URL '{base_url}'"));
            }
        }

        problems
    }
}
