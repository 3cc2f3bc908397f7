//! Configuration management for confluence-md.
//!
//! Parses `confluence-md.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings are applied during load via [`CliSettings`]. Because the CLI
//! reads each credential from its flag or environment variable first, the
//! effective precedence is: flag > environment (including `.env`) > config file
//! > built-in default.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.url`
//! - `confluence.user`
//! - `confluence.token`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub url: Option<String>,
    /// Override username (Cloud basic auth).
    pub user: Option<String>,
    /// Override API token or personal access token.
    pub token: Option<String>,
    /// Override delay between API calls in milliseconds.
    pub delay_ms: Option<u64>,
    /// Override HTTP request timeout in seconds.
    pub timeout: Option<u64>,
    /// Override resume mode.
    pub skip_existing: Option<bool>,
    /// Override maximum traversal depth.
    pub max_depth: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "confluence-md.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection configuration.
    pub confluence: ConfluenceConfig,
    /// Export behavior configuration.
    pub export: ExportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence connection configuration.
///
/// Every field is optional here; [`Config::require_credentials`] checks that
/// the required ones ended up set from some source.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    /// Confluence base URL.
    pub url: Option<String>,
    /// Username or email. Omit for bearer-token (Server PAT) auth.
    pub user: Option<String>,
    /// API token (Cloud) or personal access token (Server).
    pub token: Option<String>,
}

/// Export behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Minimum delay between consecutive API calls in milliseconds.
    pub delay_ms: u64,
    /// Per-request HTTP timeout in seconds.
    pub timeout: u64,
    /// Skip pages whose output file already exists.
    pub skip_existing: bool,
    /// Maximum traversal depth below the root page.
    pub max_depth: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delay_ms: 100,
            timeout: 30,
            skip_existing: false,
            max_depth: 50,
        }
    }
}

impl ExportConfig {
    /// Delay between API calls.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// HTTP request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Resolved Confluence credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Base URL without trailing slash.
    pub url: String,
    /// Username for basic auth; `None` selects bearer-token auth.
    pub user: Option<String>,
    /// API token or personal access token.
    pub token: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `confluence-md.toml` in current directory and parents.
    /// When no file is found the defaults are used.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(url) = &settings.url {
            self.confluence.url = Some(url.clone());
        }
        if let Some(user) = &settings.user {
            self.confluence.user = Some(user.clone());
        }
        if let Some(token) = &settings.token {
            self.confluence.token = Some(token.clone());
        }
        if let Some(delay_ms) = settings.delay_ms {
            self.export.delay_ms = delay_ms;
        }
        if let Some(timeout) = settings.timeout {
            self.export.timeout = timeout;
        }
        if let Some(skip_existing) = settings.skip_existing {
            self.export.skip_existing = skip_existing;
        }
        if let Some(max_depth) = settings.max_depth {
            self.export.max_depth = max_depth;
        }
    }

    /// Get validated Confluence credentials.
    ///
    /// An empty `user` is treated as absent, which selects bearer-token auth.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the URL or token is missing or invalid.
    pub fn require_credentials(&self) -> Result<Credentials, ConfigError> {
        let url = self.confluence.url.as_deref().unwrap_or_default().trim();
        require_non_empty(url, "confluence.url").map_err(|_| {
            ConfigError::Validation(
                "confluence.url not provided (use --url, CONFLUENCE_URL, or [confluence] url)"
                    .to_owned(),
            )
        })?;
        require_http_url(url, "confluence.url")?;

        let token = self.confluence.token.as_deref().unwrap_or_default();
        require_non_empty(token, "confluence.token").map_err(|_| {
            ConfigError::Validation(
                "confluence.token not provided (use --token, CONFLUENCE_TOKEN, or [confluence] token)"
                    .to_owned(),
            )
        })?;

        let user = self
            .confluence
            .user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_owned);

        Ok(Credentials {
            url: url.trim_end_matches('/').to_owned(),
            user,
            token: token.to_owned(),
        })
    }

    /// Search for config file in `start` and its parents.
    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Credentials are not checked here; see [`Config::require_credentials`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export.timeout == 0 {
            return Err(ConfigError::Validation(
                "export.timeout must be greater than 0".to_owned(),
            ));
        }
        if let Some(url) = self.confluence.url.as_deref()
            && !url.is_empty()
        {
            require_http_url(url, "confluence.url")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_field(&mut self.confluence.url, "confluence.url")?;
        expand::expand_field(&mut self.confluence.user, "confluence.user")?;
        expand::expand_field(&mut self.confluence.token, "confluence.token")?;
        Ok(())
    }
}
