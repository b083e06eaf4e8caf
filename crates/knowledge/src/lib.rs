//! Knowledge retrieval and answering for Asana.
//!
//! Holds the passage corpus, the embedding providers, the cosine retriever,
//! the answer synthesizer, the query pipeline and the SQLite query log.

pub mod corpus;
pub mod embeddings;
pub mod rag;
pub mod retriever;
pub mod similarity;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use asana_core::{AppError, AppResult};
pub use corpus::{BundledCorpus, CorpusSource, FileCorpus, StaticCorpus};
pub use embeddings::{EmbeddingConfig, EmbeddingEngine, EmbeddingProvider};
pub use rag::{validate_query, QueryPipeline, QueryResponse, QueryResult};
pub use retriever::{KnowledgeRetriever, RetrieverState};
pub use store::{QueryLog, QueryRecord, QueryStats};
pub use types::{KnowledgePassage, RetrievedMatch};
