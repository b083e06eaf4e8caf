//! Command handlers for the Asana CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod corpus;
pub mod feedback;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use corpus::CorpusCommand;
pub use feedback::FeedbackCommand;
pub use stats::StatsCommand;
