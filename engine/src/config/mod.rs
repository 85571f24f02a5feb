//! Configuration management
//!
//! This module handles loading, validation, and management of the analyst
//! configuration. Configuration is stored in TOML format at
//! ~/.analyst/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Data directory, log level
//! - **llm**: Chat model endpoint, credential env var, sampling settings
//! - **embedding**: Embedding endpoint, credential env var, dimensionality
//! - **retrieval**: Top-k and optional similarity floor for vector search
//!
//! The embedding `dimension` value is the single source of truth for vector
//! dimensionality: ingestion, storage validation, and query-time embedding
//! all check against it. Credentials never live in the file — each model
//! section names the environment variable that holds its API key, and the
//! variable is read once at boot.

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded once at startup and passed by reference into the selector and both
/// engines. No implicit global state is shared across call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    pub core: CoreConfig,

    /// Chat model configuration
    pub llm: LLMConfig,

    /// Embedding model configuration
    pub embedding: EmbeddingConfig,

    /// Vector retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Chat model configuration
///
/// The endpoint is OpenAI-compatible (`/chat/completions`), which covers
/// OpenRouter-hosted models as well as self-hosted gateways.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Base URL for the chat completions API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    /// Context window size in tokens
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Maximum output tokens per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature. Kept low to favor determinism
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL for the embeddings API (OpenAI-compatible `/embeddings`)
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Environment variable holding the API key.
    /// May be empty for unauthenticated local endpoints.
    #[serde(default)]
    pub api_key_env: String,

    /// Embedding dimensionality. The single source of truth: chunks are
    /// indexed, validated, and queried against this value.
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Vector retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest chunks to retrieve per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Optional similarity floor; chunks scoring below it are dropped
    #[serde(default)]
    pub similarity_floor: Option<f32>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            similarity_floor: None,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.analyst")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_llm_model() -> String {
    "deepseek/deepseek-chat".to_string()
}

fn default_llm_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_context_window() -> usize {
    32000
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f64 {
    0.1
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_embedding_base_url() -> String {
    "http://localhost:8080/v1".to_string()
}

fn default_embedding_model() -> String {
    "BAAI/bge-small-en-v1.5".to_string()
}

fn default_embedding_dimension() -> usize {
    384
}

fn default_top_k() -> usize {
    3
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_llm_api_key_env(),
            context_window: default_context_window(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            api_key_env: String::new(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.analyst/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration. Validates the configuration after loading and returns
    /// descriptive errors if validation fails.
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.analyst/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".analyst").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            core: CoreConfig {
                data_dir: default_data_dir(),
                log_level: default_log_level(),
            },
            llm: LLMConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }

    /// Path of the sqlite database holding both stores
    pub fn db_path(&self) -> PathBuf {
        self.core.data_dir.join("analyst.db")
    }

    /// Validate and process configuration
    ///
    /// Validates field ranges, expands ~ in the data directory, and creates
    /// the data directory if it doesn't exist.
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.llm.model.trim().is_empty() {
            return Err(EngineError::Config("llm.model must not be empty".to_string()));
        }
        if self.llm.api_key_env.trim().is_empty() {
            return Err(EngineError::Config(
                "llm.api_key_env must name an environment variable".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(EngineError::Config(
                "llm.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(EngineError::Config(
                "llm.max_tokens must be at least 1".to_string(),
            ));
        }

        if self.embedding.model.trim().is_empty() {
            return Err(EngineError::Config(
                "embedding.model must not be empty".to_string(),
            ));
        }
        if self.embedding.dimension == 0 {
            return Err(EngineError::Config(
                "embedding.dimension must be at least 1".to_string(),
            ));
        }

        if !(1..=32).contains(&self.retrieval.top_k) {
            return Err(EngineError::Config(
                "retrieval.top_k must be between 1 and 32".to_string(),
            ));
        }
        if let Some(floor) = self.retrieval.similarity_floor {
            if !(-1.0..=1.0).contains(&floor) {
                return Err(EngineError::Config(
                    "retrieval.similarity_floor must be between -1.0 and 1.0".to_string(),
                ));
            }
        }

        // Expand and create the data directory
        self.core.data_dir = expand_path(&self.core.data_dir)?;
        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                EngineError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default_config();

        assert_eq!(config.core.log_level, "info");
        assert_eq!(config.llm.temperature, 0.1);
        assert_eq!(config.llm.max_tokens, 512);
        assert_eq!(config.embedding.dimension, 384);
        assert_eq!(config.retrieval.top_k, 3);
        assert!(config.retrieval.similarity_floor.is_none());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("test"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/absolute/path");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_invalid_temperature_rejected() {
        let mut config = Config::default_config();
        config.llm.temperature = 3.5;
        assert!(config.validate_and_process().is_err());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let mut config = Config::default_config();
        config.embedding.dimension = 0;
        assert!(config.validate_and_process().is_err());
    }

    #[test]
    fn test_top_k_bounds() {
        let mut config = Config::default_config();
        config.retrieval.top_k = 0;
        assert!(config.validate_and_process().is_err());

        let mut config = Config::default_config();
        config.retrieval.top_k = 33;
        assert!(config.validate_and_process().is_err());
    }

    #[test]
    fn test_similarity_floor_bounds() {
        let mut config = Config::default_config();
        config.retrieval.similarity_floor = Some(1.5);
        assert!(config.validate_and_process().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default_config();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.core.log_level, deserialized.core.log_level);
        assert_eq!(config.embedding.dimension, deserialized.embedding.dimension);
    }

    #[test]
    fn test_db_path_under_data_dir() {
        let config = Config::default_config();
        assert!(config.db_path().ends_with("analyst.db"));
    }
}
