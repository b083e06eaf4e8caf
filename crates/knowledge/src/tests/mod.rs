//! Cross-module tests for retrieval and the full pipeline.
