//! Asana CLI
//!
//! Main entry point for the asana command-line tool.
//! Answers yoga questions from a local knowledge corpus with safety screening.

mod commands;

use asana_core::{
    config::{AppConfig, LogFormat},
    logging, AppResult,
};
use clap::{Parser, Subcommand};
use commands::{AskCommand, CorpusCommand, FeedbackCommand, StatsCommand};
use std::path::PathBuf;

/// Asana CLI - safety-aware yoga question answering
#[derive(Parser, Debug)]
#[command(name = "asana")]
#[command(about = "Safety-aware yoga question answering over a local corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "ASANA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "ASANA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Log line format (text, json)
    #[arg(long, global = true, env = "ASANA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Embedding provider (trigram, ollama)
    #[arg(short = 'p', long, global = true, env = "ASANA_EMBEDDING_PROVIDER")]
    embedding_provider: Option<String>,

    /// Embedding model identifier
    #[arg(short = 'm', long, global = true, env = "ASANA_EMBEDDING_MODEL")]
    embedding_model: Option<String>,

    /// Embedding vector dimensions (default from the provider)
    #[arg(long, global = true, env = "ASANA_EMBEDDING_DIMENSIONS")]
    embedding_dimensions: Option<usize>,

    /// Corpus file or directory, relative to the workspace (default: bundled passages)
    #[arg(long, global = true, env = "ASANA_CORPUS")]
    corpus: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a yoga question
    Ask(AskCommand),

    /// Rate a previous answer
    Feedback(FeedbackCommand),

    /// Inspect the knowledge corpus
    Corpus(CorpusCommand),

    /// Show query statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Base configuration: defaults, config.yaml, environment
    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.log_level,
        cli.log_format,
        cli.verbose,
        cli.no_color,
        cli.embedding_provider,
        cli.embedding_model,
        cli.embedding_dimensions,
        cli.corpus,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_format)?;

    tracing::info!("Asana CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!(
        "Embedding: {} ({})",
        config.embedding.provider,
        config.embedding.model
    );

    config.validate()?;

    // Ensure .asana directory exists
    config.ensure_asana_dir()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Feedback(_) => "feedback",
        Commands::Corpus(_) => "corpus",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Feedback(cmd) => cmd.execute(&config).await,
        Commands::Corpus(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_globals() {
        let cli = Cli::try_parse_from([
            "asana",
            "--log-format",
            "json",
            "-p",
            "ollama",
            "ask",
            "What is mountain pose?",
            "-k",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert_eq!(cli.embedding_provider.as_deref(), Some("ollama"));
        match cli.command {
            Commands::Ask(cmd) => {
                assert_eq!(cmd.query, "What is mountain pose?");
                assert_eq!(cmd.top_k, Some(2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        assert!(Cli::try_parse_from(["asana", "--log-format", "xml", "stats"]).is_err());
    }

    #[test]
    fn test_feedback_requires_rating() {
        assert!(Cli::try_parse_from(["asana", "feedback", "abc"]).is_err());
        assert!(
            Cli::try_parse_from(["asana", "feedback", "abc", "--helpful", "--not-helpful"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["asana", "feedback", "abc", "--not-helpful"]).is_ok());
    }
}
