use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Language preference used when no config file overrides it
pub const DEFAULT_LANGUAGES: &[&str] = &[
    "en", "en-US", "en-GB", "en-CA", "en-AU", "de", "fr", "es", "pt", "it",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preference-ordered language codes. Empty means the provider's own default.
    pub languages: Vec<String>,

    /// Keep basic formatting tags (<b>, <i>, ...) in caption text
    pub preserve_formatting: bool,

    /// HTTP settings
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Origin all YouTube requests are sent to
    pub base_url: String,

    /// Value of the Accept-Language header
    pub accept_language: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Request timeout; no timeout when unset
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            preserve_formatting: false,
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            accept_language: "en-US".to_string(),
            user_agent: concat!("yt-transcript/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults when none exists
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from {}", path.display());

        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Get configuration file path, if one exists.
    ///
    /// Only the per-user config directory is consulted; a `config.yaml` in the
    /// working directory usually belongs to some other tool.
    fn config_path() -> Option<PathBuf> {
        Self::config_path_in(dirs::config_dir()?)
    }

    fn config_path_in(config_dir: PathBuf) -> Option<PathBuf> {
        Some(config_dir.join("yt-transcript").join("config.yaml")).filter(|path| path.exists())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.http.base_url)
            .map_err(|_| anyhow::anyhow!("Invalid base URL in config: {}", self.http.base_url))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Base URL must use HTTP or HTTPS protocol");
        }

        if self.http.timeout_secs == Some(0) {
            anyhow::bail!("HTTP timeout must be greater than zero");
        }

        if let Some(empty) = self.languages.iter().position(|l| l.trim().is_empty()) {
            anyhow::bail!("Language code at position {} is empty", empty);
        }

        Ok(())
    }

    /// Request timeout, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.http.timeout_secs.map(Duration::from_secs)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.http.base_url.trim_end_matches('/')
    }
}
