// Configuration management module
// Handles TOML configuration loading plus environment overrides

pub mod settings;

pub use settings::{ConfigError, EmbeddingMode, OllamaSettings, SearchConfig, SearchSettings};
