//! Configuration management.
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional TOML file, then `RESEARCH_DIGEST_*` environment variables (nested
//! keys separated by `__`, e.g. `RESEARCH_DIGEST_LLM__MODEL`). API keys also
//! fall back to the conventional `GROQ_API_KEY` and `SEMANTIC_SCHOLAR_API_KEY`.

mod file_config;

pub use file_config::{default_config_toml, write_default_config};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::{DEFAULT_MODEL, GROQ_API_BASE};
use crate::utils::DEFAULT_USER_AGENT;

/// Prefix of environment overrides
const ENV_PREFIX: &str = "RESEARCH_DIGEST";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "research-digest.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Paper and enrichment source settings
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Generative analysis settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API keys for external services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Groq API key (required for analyses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groq: Option<String>,

    /// Semantic Scholar API key (optional, for higher rate limits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_scholar: Option<String>,
}

/// Source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_arxiv_url")]
    pub arxiv_url: String,

    #[serde(default = "default_semantic_scholar_url")]
    pub semantic_scholar_url: String,

    /// Number of papers kept per search
    #[serde(default = "default_max_papers")]
    pub max_papers: usize,

    #[serde(default = "default_enrichment_timeout")]
    pub enrichment_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            arxiv_url: default_arxiv_url(),
            semantic_scholar_url: default_semantic_scholar_url(),
            max_papers: default_max_papers(),
            enrichment_timeout_secs: default_enrichment_timeout(),
        }
    }
}

fn default_arxiv_url() -> String {
    crate::sources::ARXIV_API_URL.to_string()
}

fn default_semantic_scholar_url() -> String {
    crate::sources::SEMANTIC_API_BASE.to_string()
}

fn default_max_papers() -> usize {
    5
}

fn default_enrichment_timeout() -> u64 {
    10
}

/// Generative backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Bound on each analysis call
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_base_url() -> String {
    GROQ_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_http_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.enrichment_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    /// Fill unset API keys from the conventional variables via `lookup`
    pub fn with_key_fallbacks(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |v: String| if v.trim().is_empty() { None } else { Some(v) };

        self.api_keys.groq = self
            .api_keys
            .groq
            .and_then(non_blank)
            .or_else(|| lookup("GROQ_API_KEY").and_then(non_blank));
        self.api_keys.semantic_scholar = self
            .api_keys
            .semantic_scholar
            .and_then(non_blank)
            .or_else(|| lookup("SEMANTIC_SCHOLAR_API_KEY").and_then(non_blank));
        self
    }

    /// Reject settings no component can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.max_papers == 0 {
            return Err(ConfigError::Invalid(
                "sources.max_papers must be at least 1".to_string(),
            ));
        }
        for (name, secs) in [
            ("http.timeout_secs", self.http.timeout_secs),
            ("llm.timeout_secs", self.llm.timeout_secs),
            ("sources.enrichment_timeout_secs", self.sources.enrichment_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Build the layered configuration: defaults, then `path` if given, then environment
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_with_env(path, |name| std::env::var(name).ok())
}

fn load_with_env(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let mut builder =
        config::Config::builder().add_source(config::Config::try_from(&Config::default())?);

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    let config = config.with_key_fallbacks(lookup);
    config.validate()?;
    Ok(config)
}

/// Locate a config file: `./research-digest.toml`, then the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    user_config_path().filter(|p| p.is_file())
}

/// `<config_dir>/research-digest/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("research-digest").join("config.toml"))
}

/// Get the default configuration, with API keys from the environment
pub fn get_config() -> Config {
    Config::default().with_key_fallbacks(|name| std::env::var(name).ok())
}
