
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Reduced-dimension mode for latency-sensitive deployments. nomic-embed-text
/// is Matryoshka-trained, so truncating to 256 dimensions stays meaningful.
pub const FAST_EMBEDDING_DIMENSION: u32 = 256;
/// Full embedding dimension of nomic-embed-text.
pub const PRECISE_EMBEDDING_DIMENSION: u32 = 768;

const ENV_EMBEDDING_MODE: &str = "DOCS_QA_EMBEDDING_MODE";
const ENV_MATCH_THRESHOLD: &str = "DOCS_QA_MATCH_THRESHOLD";
const ENV_MAX_SOURCES: &str = "DOCS_QA_MAX_SOURCES";
const ENV_ENABLE_CACHING: &str = "DOCS_QA_ENABLE_CACHING";
const ENV_CACHE_TIMEOUT: &str = "DOCS_QA_CACHE_TIMEOUT_SECONDS";

/// Which embedding dimensionality the pipeline runs with.
///
/// This must agree with the dimensionality of vectors already stored, or
/// similarity search is meaningless; the vector store checks this at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    Fast,
    #[default]
    Precise,
}

impl EmbeddingMode {
    #[inline]
    pub fn dimension(self) -> u32 {
        match self {
            Self::Fast => FAST_EMBEDDING_DIMENSION,
            Self::Precise => PRECISE_EMBEDDING_DIMENSION,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "fast" => Some(Self::Fast),
            "precise" => Some(Self::Precise),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchConfig {
    #[serde(default)]
    pub ollama: OllamaSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OllamaSettings {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub embedding_model: String,
    pub generation_model: String,
    pub timeout_seconds: u64,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            embedding_model: "nomic-embed-text:latest".to_string(),
            generation_model: "llama3.1:8b".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub embedding_mode: EmbeddingMode,
    pub match_threshold: f32,
    pub max_sources: usize,
    pub max_context_passages: usize,
    pub enable_caching: bool,
    pub cache_timeout_seconds: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            embedding_mode: EmbeddingMode::default(),
            match_threshold: 0.35,
            max_sources: 4,
            max_context_passages: 6,
            enable_caching: true,
            cache_timeout_seconds: 3600,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid request timeout: {0} (must be between 1 and 300 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid match threshold: {0} (must be between 0.0 and 1.0)")]
    InvalidMatchThreshold(f32),
    #[error("Invalid max sources: {0} (must be between 1 and 20)")]
    InvalidMaxSources(usize),
    #[error("Invalid max context passages: {0} (must be between 1 and 50)")]
    InvalidMaxContextPassages(usize),
    #[error("Invalid cache timeout: {0} (must be between 1 and 86400 seconds)")]
    InvalidCacheTimeout(u64),
    #[error("Invalid value for {var}: {value}")]
    InvalidEnvOverride { var: String, value: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl SearchConfig {
    /// Load configuration from the default config directory, applying
    /// `DOCS_QA_*` environment overrides on top of the file contents.
    #[inline]
    pub fn load() -> Result<Self> {
        let config_dir = Self::config_dir().context("Failed to resolve config directory")?;
        Self::load_from(config_dir)
    }

    #[inline]
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            toml::from_str::<SearchConfig>(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            SearchConfig::default()
        };
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .apply_env_overrides()
            .context("Invalid environment override")?;
        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("docs-qa"))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Apply environment overrides for the runtime toggles. File settings
    /// stay authoritative for everything connection-related.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var(ENV_EMBEDDING_MODE) {
            self.search.embedding_mode =
                EmbeddingMode::parse(&value).ok_or_else(|| ConfigError::InvalidEnvOverride {
                    var: ENV_EMBEDDING_MODE.to_string(),
                    value,
                })?;
        }
        if let Ok(value) = env::var(ENV_MATCH_THRESHOLD) {
            self.search.match_threshold =
                value
                    .parse::<f32>()
                    .map_err(|_| ConfigError::InvalidEnvOverride {
                        var: ENV_MATCH_THRESHOLD.to_string(),
                        value,
                    })?;
        }
        if let Ok(value) = env::var(ENV_MAX_SOURCES) {
            self.search.max_sources =
                value
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidEnvOverride {
                        var: ENV_MAX_SOURCES.to_string(),
                        value,
                    })?;
        }
        if let Ok(value) = env::var(ENV_ENABLE_CACHING) {
            self.search.enable_caching =
                value
                    .parse::<bool>()
                    .map_err(|_| ConfigError::InvalidEnvOverride {
                        var: ENV_ENABLE_CACHING.to_string(),
                        value,
                    })?;
        }
        if let Ok(value) = env::var(ENV_CACHE_TIMEOUT) {
            self.search.cache_timeout_seconds =
                value
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidEnvOverride {
                        var: ENV_CACHE_TIMEOUT.to_string(),
                        value,
                    })?;
        }
        Ok(())
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ollama.validate()?;
        self.search.validate()?;
        Ok(())
    }

    /// Path of the LanceDB directory holding the indexed knowledge base.
    #[inline]
    pub fn vector_database_path(&self) -> PathBuf {
        self.base_dir.join("vectors")
    }
}

impl OllamaSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidProtocol(self.protocol.clone()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))?;

        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.embedding_model.clone()));
        }

        if self.generation_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.generation_model.clone()));
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ConfigError::InvalidMatchThreshold(self.match_threshold));
        }

        if self.max_sources == 0 || self.max_sources > 20 {
            return Err(ConfigError::InvalidMaxSources(self.max_sources));
        }

        if self.max_context_passages == 0 || self.max_context_passages > 50 {
            return Err(ConfigError::InvalidMaxContextPassages(
                self.max_context_passages,
            ));
        }

        if self.enable_caching
            && (self.cache_timeout_seconds == 0 || self.cache_timeout_seconds > 86400)
        {
            return Err(ConfigError::InvalidCacheTimeout(self.cache_timeout_seconds));
        }

        Ok(())
    }
}
