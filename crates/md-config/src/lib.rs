//! Configuration management for the Markdown service.
//!
//! Parses `markdown.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [parser]
//! id = "gfm"
//!
//! [parser.settings]
//! expire = 3600
//! extensions = [{ id = "math" }]
//!
//! [cache]
//! enabled = true
//! dir = ".markdown/cache"
//!
//! [remote]
//! base_url = "https://docs.example.com"
//! timeout = 30
//! expire = 600
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `remote.base_url` and `cache.dir` support `${VAR}` and `${VAR:-default}`;
//! `cache.dir` additionally expands a leading `~`.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the default parser id.
    pub parser: Option<String>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Override base URL for relative remote URLs.
    pub base_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "markdown.toml";

/// Default HTTP timeout for remote Markdown, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parser selection and global parser settings.
    pub parser: ParserConfig,
    /// Cache configuration (paths are relative strings from TOML).
    cache: CacheConfigRaw,
    /// Remote Markdown configuration.
    pub remote: RemoteConfig,

    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Parser configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Default parser id. When unset, the first installed parser is used.
    pub id: Option<String>,
    /// Global parser settings, merged under caller-supplied configuration.
    pub settings: Map<String, Value>,
}

/// Raw cache configuration as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
}

/// Resolved cache configuration with an absolute directory.
#[derive(Debug, Default)]
pub struct CacheConfig {
    /// Whether parsed Markdown is cached on disk.
    pub enabled: bool,
    /// Cache directory.
    pub dir: PathBuf,
}

/// Remote Markdown configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL that relative URLs are resolved against.
    pub base_url: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout: u64,
    /// Lifetime of cached remote Markdown in seconds. Unset means permanent.
    pub expire: Option<i64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            expire: None,
        }
    }
}

impl RemoteConfig {
    /// HTTP timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
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
        /// Config field path (e.g., "`remote.base_url`").
        field: String,
        /// Error message (e.g., "${`DOCS_HOST`} not set").
        message: String,
    },
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
    /// Otherwise, searches for `markdown.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
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
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving paths against `base`.
    pub fn from_toml(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(parser) = &settings.parser {
            self.parser.id = Some(parser.clone());
        }
        if let Some(enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = enabled;
        }
        if let Some(dir) = &settings.cache_dir {
            self.cache_resolved.dir.clone_from(dir);
        }
        if let Some(base_url) = &settings.base_url {
            self.remote.base_url = Some(base_url.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            parser: ParserConfig::default(),
            cache: CacheConfigRaw::default(),
            remote: RemoteConfig::default(),
            cache_resolved: CacheConfig {
                enabled: true,
                dir: base.join(".markdown").join("cache"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(id) = &self.parser.id
            && id.is_empty()
        {
            return Err(ConfigError::Validation(
                "parser.id cannot be empty".to_owned(),
            ));
        }

        if let Some(base_url) = &self.remote.base_url {
            require_http_url(base_url, "remote.base_url")?;
        }

        if self.remote.timeout == 0 {
            return Err(ConfigError::Validation(
                "remote.timeout must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(url) = &self.remote.base_url {
            self.remote.base_url = Some(expand::expand_env(url, "remote.base_url")?);
        }
        if let Some(dir) = &self.cache.dir {
            self.cache.dir = Some(expand::expand_path(dir, "cache.dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let dir = self.cache.dir.as_deref().map_or_else(
            || config_dir.join(".markdown").join("cache"),
            |dir| config_dir.join(dir),
        );
        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(true),
            dir,
        };
    }
}
