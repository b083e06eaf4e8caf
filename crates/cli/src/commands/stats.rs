//! Stats command handler.
//!
//! Summarizes the query log.

use asana_core::{config::AppConfig, AppResult};
use asana_knowledge::QueryLog;
use clap::Args;

/// Show query statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Number of recent queries to list
    #[arg(short, long, default_value = "5")]
    pub recent: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let log = QueryLog::open(&config.resolve_store_path())?;
        let stats = log.stats(self.recent)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("Total queries:  {}", stats.total_queries);
        println!(
            "Unsafe queries: {} ({:.1}%)",
            stats.unsafe_queries, stats.unsafe_percentage
        );

        if !stats.recent.is_empty() {
            println!();
            println!("Recent:");
            for entry in &stats.recent {
                let flag = if entry.is_unsafe {
                    format!(" [{}]", entry.safety_reason)
                } else {
                    String::new()
                };
                println!(
                    "  {}  {}{}  ({})",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.query,
                    flag,
                    entry.id
                );
            }
        }

        Ok(())
    }
}
