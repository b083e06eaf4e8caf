//! Query pipeline: safety classification, retrieval, then answer synthesis.

use crate::corpus::{BundledCorpus, CorpusSource, FileCorpus};
use crate::embeddings::{EmbeddingConfig, EmbeddingEngine};
use crate::rag::answer::AnswerSynthesizer;
use crate::rag::types::QueryResult;
use crate::retriever::KnowledgeRetriever;
use asana_core::{AppConfig, AppError, AppResult};
use asana_safety::SafetyClassifier;
use std::sync::Arc;

/// Default number of passages retrieved per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Trim a raw query and reject it when nothing is left.
///
/// Callers run this before [`QueryPipeline::process_query`], which assumes a
/// non-empty query.
pub fn validate_query(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidQuery("Query is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Wires the classifier, retriever and synthesizer together.
#[derive(Debug)]
pub struct QueryPipeline {
    classifier: SafetyClassifier,
    retriever: KnowledgeRetriever,
    synthesizer: AnswerSynthesizer,
    top_k: usize,
}

impl Default for QueryPipeline {
    fn default() -> Self {
        Self::new(
            SafetyClassifier::new(),
            KnowledgeRetriever::default(),
            AnswerSynthesizer::new(),
            DEFAULT_TOP_K,
        )
    }
}

impl QueryPipeline {
    pub fn new(
        classifier: SafetyClassifier,
        retriever: KnowledgeRetriever,
        synthesizer: AnswerSynthesizer,
        top_k: usize,
    ) -> Self {
        Self {
            classifier,
            retriever,
            synthesizer,
            top_k: top_k.max(1),
        }
    }

    /// Production wiring from the merged application config.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let engine = EmbeddingEngine::from_config(&EmbeddingConfig::from(&config.embedding))?;

        let corpus: Arc<dyn CorpusSource> = match &config.corpus_path {
            Some(path) => Arc::new(FileCorpus::new(path)),
            None => Arc::new(BundledCorpus),
        };

        Ok(Self::new(
            SafetyClassifier::new(),
            KnowledgeRetriever::new(corpus, engine),
            AnswerSynthesizer::new(),
            config.retrieval.top_k,
        ))
    }

    pub fn retriever(&self) -> &KnowledgeRetriever {
        &self.retriever
    }

    pub fn classifier(&self) -> &SafetyClassifier {
        &self.classifier
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer a trimmed, non-empty query. Never fails.
    ///
    /// Retrieval runs for unsafe queries too, so the matches are available
    /// for audit.
    pub async fn process_query(&self, query: &str) -> QueryResult {
        tracing::info!("Processing query: {}", query);

        let verdict = self.classifier.classify(query);
        tracing::info!(
            unsafe_query = verdict.is_unsafe,
            category = %verdict.category,
            severity = %verdict.severity,
            "Safety check complete"
        );

        let matches = self.retriever.search(query, self.top_k).await;
        tracing::info!("Retrieved {} passages", matches.len());

        let answer_text = self.synthesizer.synthesize(query, &verdict, &matches);
        tracing::debug!("Answer generated ({} chars)", answer_text.len());

        QueryResult {
            answer_text,
            matches,
            verdict,
        }
    }
}
