//! Embedding engine for the knowledge retriever.
//!
//! Pairs an optional primary (learned-model) provider with the deterministic
//! fallback provider. Every primary result is checked for count and
//! dimension before use; anything off is reported as
//! [`AppError::EmbeddingUnavailable`].

pub mod config;
pub mod provider;
pub mod providers;

pub use config::{EmbeddingConfig, FALLBACK_DIMENSIONS};
pub use provider::{create_provider, EmbeddingProvider};

use asana_core::{AppError, AppResult};
use providers::trigram::TrigramProvider;
use std::sync::Arc;

/// Primary provider plus deterministic fallback.
#[derive(Debug, Clone)]
pub struct EmbeddingEngine {
    primary: Option<Arc<dyn EmbeddingProvider>>,
    fallback: Arc<dyn EmbeddingProvider>,
}

impl Default for EmbeddingEngine {
    fn default() -> Self {
        Self::fallback_only()
    }
}

impl EmbeddingEngine {
    pub fn new(
        primary: Option<Arc<dyn EmbeddingProvider>>,
        fallback: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Trigram embeddings only.
    pub fn fallback_only() -> Self {
        Self::new(None, Arc::new(TrigramProvider::new(FALLBACK_DIMENSIONS)))
    }

    /// Build the engine a config asks for.
    ///
    /// `trigram` selects fallback-only operation at the configured
    /// dimensions. Any other provider becomes the primary, backed by a
    /// default-size trigram fallback.
    pub fn from_config(config: &EmbeddingConfig) -> AppResult<Self> {
        if config.is_fallback_only() {
            config.validate()?;
            return Ok(Self::new(None, Arc::new(TrigramProvider::new(config.dimensions))));
        }

        let primary = create_provider(config)?;
        tracing::debug!(
            "Embedding engine: primary={} (model: {}, {} dims), fallback=trigram",
            primary.provider_name(),
            primary.model_name(),
            primary.dimensions()
        );

        Ok(Self::new(
            Some(primary),
            Arc::new(TrigramProvider::new(FALLBACK_DIMENSIONS)),
        ))
    }

    pub fn primary(&self) -> Option<&Arc<dyn EmbeddingProvider>> {
        self.primary.as_ref()
    }

    pub fn fallback(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.fallback
    }

    /// Warm up the primary provider and embed every text with it.
    pub async fn embed_primary_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let provider = self.require_primary()?;
        provider.warm_up().await?;

        tracing::info!(
            "Embedding {} texts using provider '{}' (model: {})",
            texts.len(),
            provider.provider_name(),
            provider.model_name()
        );

        let embeddings = provider.embed_batch(texts).await?;
        check_batch(provider.as_ref(), &embeddings, texts.len())?;
        Ok(embeddings)
    }

    /// Embed one text with the primary provider.
    pub async fn embed_primary(&self, text: &str) -> AppResult<Vec<f32>> {
        let provider = self.require_primary()?;
        let embedding = provider.embed(text).await?;
        check_batch(provider.as_ref(), std::slice::from_ref(&embedding), 1)?;
        Ok(embedding)
    }

    /// Embed every text with the fallback provider.
    pub async fn embed_fallback_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let embeddings = self.fallback.embed_batch(texts).await?;
        check_batch(self.fallback.as_ref(), &embeddings, texts.len())?;
        Ok(embeddings)
    }

    /// Embed one text with the fallback provider.
    pub async fn embed_fallback(&self, text: &str) -> AppResult<Vec<f32>> {
        let embedding = self.fallback.embed(text).await?;
        check_batch(self.fallback.as_ref(), std::slice::from_ref(&embedding), 1)?;
        Ok(embedding)
    }

    fn require_primary(&self) -> AppResult<&Arc<dyn EmbeddingProvider>> {
        self.primary.as_ref().ok_or_else(|| {
            AppError::EmbeddingUnavailable("No primary embedding provider configured".to_string())
        })
    }
}

fn check_batch(
    provider: &dyn EmbeddingProvider,
    embeddings: &[Vec<f32>],
    expected: usize,
) -> AppResult<()> {
    if embeddings.len() != expected {
        return Err(AppError::EmbeddingUnavailable(format!(
            "Provider '{}' returned {} embeddings for {} texts",
            provider.provider_name(),
            embeddings.len(),
            expected
        )));
    }

    if let Some(bad) = embeddings
        .iter()
        .find(|e| e.len() != provider.dimensions())
    {
        return Err(AppError::EmbeddingUnavailable(format!(
            "Provider '{}' returned {} dimensions, expected {}",
            provider.provider_name(),
            bad.len(),
            provider.dimensions()
        )));
    }

    Ok(())
}
