//! Configuration management for Asana.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (.asana/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones. Workspace state (config, query log)
//! lives under `.asana/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers the knowledge crate knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .asana/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Retrieval settings
    pub retrieval: RetrievalSettings,

    /// Corpus file or directory; `None` uses the bundled corpus
    pub corpus_path: Option<PathBuf>,

    /// Query log database; `None` uses `.asana/queries.sqlite`
    pub store_path: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "Unknown log format: {}. Supported: text, json",
                other
            ))),
        }
    }
}

/// Embedding provider settings from config.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name: "trigram" (deterministic) or "ollama" (learned model)
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Provider endpoint (Ollama base URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[serde(rename = "timeoutSecs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(), // Works offline
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingSettings {
    /// Default model and dimensions for a known provider.
    pub fn provider_defaults(provider: &str) -> Option<(&'static str, usize)> {
        match provider {
            "trigram" => Some(("trigram-v1", 384)),
            "ollama" => Some(("nomic-embed-text", 768)),
            _ => None,
        }
    }

    /// Switch to another provider.
    ///
    /// Model and dimensions reset to the new provider's defaults, so explicit
    /// values must be applied after this call. Selecting the current provider
    /// changes nothing.
    pub fn select_provider(&mut self, provider: String) {
        if provider == self.provider {
            return;
        }
        if let Some((model, dimensions)) = Self::provider_defaults(&provider) {
            self.model = model.to_string();
            self.dimensions = dimensions;
        }
        self.provider = provider;
    }
}

/// Retrieval settings from config.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Number of passages returned per query
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,

    /// Characters of passage content shown in source previews
    #[serde(rename = "previewChars", default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_top_k() -> usize {
    3
}

fn default_preview_chars() -> usize {
    100
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            preview_chars: default_preview_chars(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    embedding: Option<EmbeddingFileSection>,
    retrieval: Option<RetrievalSettings>,
    corpus: Option<PathSection>,
    storage: Option<PathSection>,
    logging: Option<LoggingSection>,
}

/// Partial embedding section; missing keys keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EmbeddingFileSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    endpoint: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PathSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    format: Option<LogFormat>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            log_format: LogFormat::Text,
            verbose: false,
            no_color: false,
            embedding: EmbeddingSettings::default(),
            retrieval: RetrievalSettings::default(),
            corpus_path: None,
            store_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, the config file and defaults.
    ///
    /// Environment variables:
    /// - `ASANA_WORKSPACE`: Override workspace path
    /// - `ASANA_CONFIG`: Path to config file
    /// - `ASANA_EMBEDDING_PROVIDER`: Embedding provider
    /// - `ASANA_EMBEDDING_MODEL`: Embedding model identifier
    /// - `ASANA_EMBEDDING_DIMENSIONS`: Embedding vector dimensions
    /// - `ASANA_CORPUS`: Corpus file or directory, relative to the workspace
    /// - `OLLAMA_URL`: Ollama endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use asana_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking the place of `ASANA_WORKSPACE` and `ASANA_CONFIG`.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var("ASANA_WORKSPACE").ok().map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("ASANA_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.asana_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("ASANA_EMBEDDING_PROVIDER") {
            config.embedding.select_provider(provider);
        }

        if let Ok(model) = std::env::var("ASANA_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }

        if let Ok(dimensions) = std::env::var("ASANA_EMBEDDING_DIMENSIONS") {
            config.embedding.dimensions = dimensions.parse().map_err(|_| {
                AppError::Config(format!(
                    "Invalid ASANA_EMBEDDING_DIMENSIONS: {}",
                    dimensions
                ))
            })?;
        }

        if let Ok(endpoint) = std::env::var("OLLAMA_URL") {
            config.embedding.endpoint = Some(endpoint);
        }

        if let Ok(corpus) = std::env::var("ASANA_CORPUS") {
            config.corpus_path = Some(config.workspace.join(corpus));
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    ///
    /// Relative corpus and storage paths resolve against the workspace.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding.select_provider(provider);
            }
            if let Some(model) = embedding.model {
                result.embedding.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                result.embedding.dimensions = dimensions;
            }
            if let Some(endpoint) = embedding.endpoint {
                result.embedding.endpoint = Some(endpoint);
            }
            if let Some(timeout_secs) = embedding.timeout_secs {
                result.embedding.timeout_secs = timeout_secs;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(path) = config_file.corpus.and_then(|c| c.path) {
            result.corpus_path = Some(result.workspace.join(path));
        }

        if let Some(path) = config_file.storage.and_then(|s| s.path) {
            result.store_path = Some(result.workspace.join(path));
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    /// A new embedding provider brings its default model and dimensions unless
    /// those are given too. A relative corpus path resolves against the
    /// workspace.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        log_level: Option<String>,
        log_format: Option<LogFormat>,
        verbose: bool,
        no_color: bool,
        embedding_provider: Option<String>,
        embedding_model: Option<String>,
        embedding_dimensions: Option<usize>,
        corpus_path: Option<PathBuf>,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if let Some(log_format) = log_format {
            self.log_format = log_format;
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if let Some(provider) = embedding_provider {
            self.embedding.select_provider(provider);
        }

        if let Some(model) = embedding_model {
            self.embedding.model = model;
        }

        if let Some(dimensions) = embedding_dimensions {
            self.embedding.dimensions = dimensions;
        }

        if let Some(corpus_path) = corpus_path {
            self.corpus_path = Some(self.workspace.join(corpus_path));
        }

        self
    }

    /// Get the path to the .asana directory.
    pub fn asana_dir(&self) -> PathBuf {
        self.workspace.join(".asana")
    }

    /// Ensure the .asana directory exists.
    pub fn ensure_asana_dir(&self) -> AppResult<()> {
        let asana_dir = self.asana_dir();
        if !asana_dir.exists() {
            std::fs::create_dir_all(&asana_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .asana directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Path of the SQLite query log.
    pub fn resolve_store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| self.asana_dir().join("queries.sqlite"))
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.embedding.provider.as_str();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be at least 1".to_string(),
            ));
        }

        if let Some(ref corpus) = self.corpus_path {
            if !corpus.exists() {
                return Err(AppError::Config(format!(
                    "Corpus path does not exist: {:?}",
                    corpus
                )));
            }
        }

        Ok(())
    }
}
