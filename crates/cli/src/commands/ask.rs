//! Ask command handler.
//!
//! Runs a question through the query pipeline and records the result.

use asana_core::{config::AppConfig, AppResult};
use asana_knowledge::{validate_query, QueryLog, QueryPipeline, QueryResponse};
use clap::Args;

/// Ask a yoga question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Number of passages to retrieve (default from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not record the query in the query log
    #[arg(long)]
    pub no_store: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask options: {:?}", self);

        let query = validate_query(&self.query)?;

        let mut config = config.clone();
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
        }

        let pipeline = QueryPipeline::from_config(&config)?;
        let result = pipeline.process_query(&query).await;

        let query_id = if self.no_store {
            None
        } else {
            let log = QueryLog::open(&config.resolve_store_path())?;
            Some(log.record(&query, &result)?)
        };

        let response = result.to_response(config.retrieval.preview_chars);

        if self.json {
            let output = serde_json::json!({
                "queryId": query_id,
                "response": response,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_response(&response, query_id.as_deref());
        }

        Ok(())
    }
}

fn print_response(response: &QueryResponse, query_id: Option<&str>) {
    if let Some(warning) = &response.warning {
        println!("{}", warning.title);
        println!("{}", warning.message);
        println!();
    }

    println!("{}", response.answer);

    if let Some(warning) = &response.warning {
        println!();
        println!("{}", warning.disclaimer);
    }

    if !response.sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, source) in response.sources.iter().enumerate() {
            println!(
                "  {}. {} [{}] (score: {:.3})",
                i + 1,
                source.title,
                source.id,
                source.score
            );
            println!("     {}", source.content_preview);
        }
    }

    if let Some(id) = query_id {
        println!();
        println!("Query ID: {}", id);
    }
}
