//! Corpus command handler.
//!
//! Lists passages and runs retrieval without answer synthesis.

use asana_core::{config::AppConfig, AppResult};
use asana_knowledge::QueryPipeline;
use clap::{Args, Subcommand};

/// Inspect the knowledge corpus
#[derive(Args, Debug)]
pub struct CorpusCommand {
    #[command(subcommand)]
    pub action: CorpusAction,
}

#[derive(Subcommand, Debug)]
pub enum CorpusAction {
    /// List loaded passages
    List(CorpusListCommand),
    /// Rank passages against a query
    Search(CorpusSearchCommand),
}

impl CorpusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            CorpusAction::List(cmd) => cmd.execute(config).await,
            CorpusAction::Search(cmd) => cmd.execute(config).await,
        }
    }
}

/// List loaded passages
#[derive(Args, Debug)]
pub struct CorpusListCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CorpusListCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing corpus list command");

        let pipeline = QueryPipeline::from_config(config)?;
        let passages = pipeline.retriever().passages().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(passages)?);
            return Ok(());
        }

        println!("{} passages", passages.len());
        for passage in passages {
            println!("  {}  {} ({})", passage.id, passage.title, passage.category);
        }

        Ok(())
    }
}

/// Rank passages against a query
#[derive(Args, Debug)]
pub struct CorpusSearchCommand {
    /// Query text
    pub query: String,

    /// Number of passages to return
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CorpusSearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing corpus search command");

        let query = asana_knowledge::validate_query(&self.query)?;
        let pipeline = QueryPipeline::from_config(config)?;
        let k = self.top_k.unwrap_or(config.retrieval.top_k);
        let matches = pipeline.retriever().search(&query, k).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&matches)?);
            return Ok(());
        }

        for (i, m) in matches.iter().enumerate() {
            println!(
                "{}. [{:.3}] {} ({})",
                i + 1,
                m.score,
                m.passage.title,
                m.passage.id
            );
            println!("   {}", m.passage.preview(config.retrieval.preview_chars));
        }

        Ok(())
    }
}
