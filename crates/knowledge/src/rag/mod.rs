//! Answering over the yoga corpus.
//!
//! [`QueryPipeline`] runs the safety classifier, the retriever and the
//! [`AnswerSynthesizer`] in that order and returns a [`QueryResult`].

pub mod answer;
pub mod pipeline;
pub mod types;

pub use answer::{AnswerIntent, AnswerSynthesizer, NO_INFORMATION_ANSWER};
pub use pipeline::{validate_query, QueryPipeline, DEFAULT_TOP_K};
pub use types::{QueryResponse, QueryResult, SourceRef, DEFAULT_PREVIEW_CHARS};
