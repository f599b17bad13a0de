//! Config file generation for `config init`.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api_keys]
//! groq = "your-groq-key"
//! semantic_scholar = "your-s2-key"
//!
//! [sources]
//! arxiv_url = "http://export.arxiv.org/api/query"
//! semantic_scholar_url = "https://api.semanticscholar.org/graph/v1"
//! max_papers = 5
//! enrichment_timeout_secs = 10
//!
//! [llm]
//! base_url = "https://api.groq.com/openai/v1"
//! model = "llama-3.1-8b-instant"
//! timeout_secs = 60
//!
//! [http]
//! timeout_secs = 30
//! user_agent = "research-digest/0.1.0"
//!
//! [logging]
//! level = "warn"
//! format = "text"
//! ```

use std::path::Path;

use super::{Config, ConfigError};

const HEADER: &str = "\
# research-digest configuration
#
# API keys can also be supplied through GROQ_API_KEY and
# SEMANTIC_SCHOLAR_API_KEY. Any setting can be overridden with
# RESEARCH_DIGEST_<SECTION>__<KEY>, e.g. RESEARCH_DIGEST_LLM__MODEL.

";

/// Render the default configuration as commented TOML
pub fn default_config_toml() -> Result<String, ConfigError> {
    let body = toml::to_string_pretty(&Config::default())
        .map_err(|e| ConfigError::Serialize(e.to_string()))?;
    Ok(format!("{}{}", HEADER, body))
}

/// Write the default configuration to `path`, creating parent directories.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    std::fs::write(path, default_config_toml()?).map_err(io_err)
}
