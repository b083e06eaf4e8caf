//! Knowledge retriever.
//!
//! Brute-force cosine ranking over a small static corpus. Passages and their
//! embeddings are built once, on first use or through
//! [`KnowledgeRetriever::initialize`]; concurrent first callers share that
//! single run.

use crate::corpus::{BundledCorpus, CorpusSource};
use crate::embeddings::EmbeddingEngine;
use crate::similarity::rank;
use crate::types::{KnowledgePassage, RetrievedMatch};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lifecycle of the passage index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieverState {
    Uninitialized,
    Initializing,
    Ready,
}

impl RetrieverState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RetrieverState::Initializing,
            2 => RetrieverState::Ready,
            _ => RetrieverState::Uninitialized,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            RetrieverState::Uninitialized => 0,
            RetrieverState::Initializing => 1,
            RetrieverState::Ready => 2,
        }
    }
}

/// Passages with one embedding set per provider.
#[derive(Debug)]
struct PassageIndex {
    passages: Vec<KnowledgePassage>,
    fallback: Vec<Vec<f32>>,
    /// `None` when no primary is configured or it failed at startup
    primary: Option<Vec<Vec<f32>>>,
}

/// Ranks corpus passages against a query.
#[derive(Debug)]
pub struct KnowledgeRetriever {
    corpus: Arc<dyn CorpusSource>,
    engine: EmbeddingEngine,
    index: OnceCell<PassageIndex>,
    state: AtomicU8,
}

impl Default for KnowledgeRetriever {
    fn default() -> Self {
        Self::new(Arc::new(BundledCorpus), EmbeddingEngine::fallback_only())
    }
}

impl KnowledgeRetriever {
    pub fn new(corpus: Arc<dyn CorpusSource>, engine: EmbeddingEngine) -> Self {
        Self {
            corpus,
            engine,
            index: OnceCell::new(),
            state: AtomicU8::new(RetrieverState::Uninitialized.as_u8()),
        }
    }

    pub fn state(&self) -> RetrieverState {
        RetrieverState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Load and embed the corpus now. Returns the passage count.
    pub async fn initialize(&self) -> usize {
        self.index().await.passages.len()
    }

    /// The loaded corpus, in corpus order.
    pub async fn passages(&self) -> &[KnowledgePassage] {
        &self.index().await.passages
    }

    /// Whether queries are being scored with the primary provider.
    pub async fn primary_active(&self) -> bool {
        self.index().await.primary.is_some()
    }

    /// Return up to `k` passages ranked by similarity to `query`.
    ///
    /// `k` of 0 is treated as 1. Embedding failures fall back to the
    /// deterministic provider; an empty corpus gives an empty list.
    pub async fn search(&self, query: &str, k: usize) -> Vec<RetrievedMatch> {
        let index = self.index().await;
        let k = k.max(1);

        if index.passages.is_empty() {
            tracing::debug!("Corpus is empty, no passages to rank");
            return Vec::new();
        }

        let ranked = match &index.primary {
            Some(primary_embeddings) => match self.engine.embed_primary(query).await {
                Ok(query_embedding) => rank(&query_embedding, primary_embeddings, k),
                Err(e) => {
                    tracing::warn!("Primary query embedding failed, using fallback: {}", e);
                    let query_embedding = self.fallback_query_embedding(query).await;
                    rank(&query_embedding, &index.fallback, k)
                }
            },
            None => {
                let query_embedding = self.fallback_query_embedding(query).await;
                rank(&query_embedding, &index.fallback, k)
            }
        };

        if let Some((_, top)) = ranked.first() {
            tracing::debug!("Retrieved {} passages (top score: {:.3})", ranked.len(), top);
        }

        ranked
            .into_iter()
            .map(|(idx, similarity)| RetrievedMatch {
                passage: index.passages[idx].clone(),
                score: similarity.clamp(0.0, 1.0),
            })
            .collect()
    }

    async fn index(&self) -> &PassageIndex {
        self.index.get_or_init(|| self.build_index()).await
    }

    async fn build_index(&self) -> PassageIndex {
        self.set_state(RetrieverState::Initializing);
        tracing::info!("Loading corpus from {}", self.corpus.describe());

        let passages = match self.corpus.load().await {
            Ok(passages) => passages,
            Err(e) => {
                tracing::error!("Failed to load corpus, continuing with no passages: {}", e);
                Vec::new()
            }
        };

        if passages.is_empty() {
            tracing::warn!("Corpus has no passages; every query will return no matches");
        }

        let texts: Vec<String> = passages.iter().map(|p| p.embedding_text()).collect();

        let fallback = match self.engine.embed_fallback_batch(&texts).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                tracing::error!("Fallback embedding failed, scores will be zero: {}", e);
                vec![vec![0.0; self.engine.fallback().dimensions()]; texts.len()]
            }
        };

        let primary = match self.engine.primary() {
            Some(_) if texts.is_empty() => None,
            Some(provider) => match self.engine.embed_primary_batch(&texts).await {
                Ok(embeddings) => Some(embeddings),
                Err(e) => {
                    tracing::warn!(
                        "Primary embeddings from '{}' unavailable, retrieval runs on fallback only: {}",
                        provider.provider_name(),
                        e
                    );
                    None
                }
            },
            None => None,
        };

        tracing::info!(
            "Retriever ready: {} passages, primary embeddings {}",
            passages.len(),
            if primary.is_some() { "active" } else { "inactive" }
        );

        self.set_state(RetrieverState::Ready);
        PassageIndex {
            passages,
            fallback,
            primary,
        }
    }

    async fn fallback_query_embedding(&self, query: &str) -> Vec<f32> {
        match self.engine.embed_fallback(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::error!("Fallback query embedding failed: {}", e);
                vec![0.0; self.engine.fallback().dimensions()]
            }
        }
    }

    fn set_state(&self, state: RetrieverState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}
