//! Application configuration for DocQA.
//!
//! User config lives at `~/.docqa/docqa.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocQaError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docqa.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docqa";

// ---------------------------------------------------------------------------
// Config structs (matching docqa.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenRouter settings.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Chunking and question generation settings.
    #[serde(default)]
    pub qa: QaConfig,
}

/// `[openrouter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for every generation call.
    #[serde(default = "default_model")]
    pub model: String,

    /// API root; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `HTTP-Referer` when non-empty.
    #[serde(default)]
    pub site_url: String,

    /// Sent as `X-Title` when non-empty.
    #[serde(default)]
    pub site_name: String,

    /// HTTP request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            site_url: String::new(),
            site_name: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "openai/gpt-4.1-nano".into()
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_timeout_secs() -> u64 {
    60
}

/// `[qa]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaConfig {
    /// Context window size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Questions per challenge. The generation prompt asks for three, so
    /// larger values are capped at three.
    #[serde(default = "default_question_count")]
    pub question_count: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            question_count: default_question_count(),
        }
    }
}

fn default_chunk_size() -> usize {
    2000
}
fn default_question_count() -> usize {
    3
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docqa/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DocQaError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docqa/docqa.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocQaError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        DocQaError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.qa.chunk_size == 0 {
            return Err(DocQaError::config("qa.chunk_size must be at least 1"));
        }
        if self.qa.question_count == 0 {
            return Err(DocQaError::config("qa.question_count must be at least 1"));
        }
        url::Url::parse(&self.openrouter.base_url).map_err(|e| {
            DocQaError::config(format!(
                "openrouter.base_url '{}' is not a valid URL: {e}",
                self.openrouter.base_url
            ))
        })?;
        Ok(())
    }
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_at(&config_file_path()?)
}

/// Write a default config file at `path`, replacing whatever is there.
///
/// The existing file is never read, so a broken config can always be reset.
pub fn init_config_at(path: &Path) -> Result<PathBuf> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| DocQaError::io(dir, e))?;
    }

    let path = path.to_path_buf();
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocQaError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocQaError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the OpenRouter API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.openrouter.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(DocQaError::config(format!(
            "OpenRouter API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://openrouter.ai/keys"
        ))),
    }
}
