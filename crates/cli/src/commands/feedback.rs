//! Feedback command handler.

use asana_core::{config::AppConfig, AppResult};
use asana_knowledge::QueryLog;
use clap::{ArgGroup, Args};

/// Rate a previous answer
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("rating")
        .required(true)
        .multiple(true)
        .args(["helpful", "not_helpful", "text"])
))]
pub struct FeedbackCommand {
    /// Query ID printed by `asana ask`
    pub id: String,

    /// The answer was helpful
    #[arg(long, conflicts_with = "not_helpful")]
    pub helpful: bool,

    /// The answer was not helpful
    #[arg(long)]
    pub not_helpful: bool,

    /// Free-form feedback text
    #[arg(short, long)]
    pub text: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl FeedbackCommand {
    fn rating(&self) -> Option<bool> {
        match (self.helpful, self.not_helpful) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing feedback command for query {}", self.id);

        let log = QueryLog::open(&config.resolve_store_path())?;
        log.attach_feedback(&self.id, self.rating(), self.text.as_deref().unwrap_or(""))?;

        if self.json {
            let output = serde_json::json!({
                "success": true,
                "queryId": self.id,
                "helpful": self.rating(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Feedback saved for query {}", self.id);
        }

        Ok(())
    }
}
