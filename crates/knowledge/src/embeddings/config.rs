//! Embedding configuration types.

use asana_core::config::EmbeddingSettings;
use asana_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Dimensions of the deterministic fallback embeddings.
pub const FALLBACK_DIMENSIONS: usize = 384;

/// Settings for building one embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Provider endpoint, when the provider talks to a server
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: FALLBACK_DIMENSIONS,
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl From<&EmbeddingSettings> for EmbeddingConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
            endpoint: settings.endpoint.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }
}

impl EmbeddingConfig {
    /// Default Ollama setup: nomic-embed-text at 768 dimensions.
    pub fn ollama() -> Self {
        let mut settings = EmbeddingSettings::default();
        settings.select_provider("ollama".to_string());
        Self::from(&settings)
    }

    /// Whether this config selects the deterministic provider only.
    pub fn is_fallback_only(&self) -> bool {
        self.provider == "trigram"
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.dimensions == 0 {
            return Err(AppError::Config(format!(
                "Embedding provider '{}' needs dimensions > 0",
                self.provider
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "trigram");
        assert_eq!(config.model, "trigram-v1");
        assert_eq!(config.dimensions, 384);
        assert!(config.is_fallback_only());
    }

    #[test]
    fn test_from_settings() {
        let settings = EmbeddingSettings {
            provider: "ollama".to_string(),
            model: "mxbai-embed-large".to_string(),
            dimensions: 1024,
            endpoint: Some("http://gpu-box:11434".to_string()),
            timeout_secs: 5,
        };

        let config = EmbeddingConfig::from(&settings);
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.dimensions, 1024);
        assert_eq!(config.endpoint.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.is_fallback_only());
    }

    #[test]
    fn test_validate_zero_dimensions() {
        let config = EmbeddingConfig {
            dimensions: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
