//! Pipeline result types.

use crate::types::RetrievedMatch;
use asana_safety::{SafetyVerdict, SafetyWarning};
use serde::{Deserialize, Serialize};

/// Default number of content characters shown per source.
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

/// Everything the pipeline produced for one query.
///
/// Owned by the caller; the pipeline keeps no reference to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub answer_text: String,

    /// Ranked matches, present even for unsafe queries
    pub matches: Vec<RetrievedMatch>,

    pub verdict: SafetyVerdict,
}

impl QueryResult {
    /// Caller-facing shape with truncated source previews.
    pub fn to_response(&self, preview_chars: usize) -> QueryResponse {
        QueryResponse {
            answer: self.answer_text.clone(),
            sources: self
                .matches
                .iter()
                .map(|m| SourceRef {
                    id: m.passage.id.clone(),
                    title: m.passage.title.clone(),
                    content_preview: m.passage.preview(preview_chars),
                    score: m.score,
                })
                .collect(),
            verdict: self.verdict.clone(),
            warning: self.verdict.warning(),
        }
    }
}

/// A source passage as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub id: String,
    pub title: String,
    pub content_preview: String,
    pub score: f32,
}

/// Response returned to callers of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub verdict: SafetyVerdict,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<SafetyWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnowledgePassage;
    use asana_safety::{RiskCategory, Severity};

    fn sample_result(verdict: SafetyVerdict) -> QueryResult {
        QueryResult {
            answer_text: "In yoga: something".to_string(),
            matches: vec![RetrievedMatch {
                passage: KnowledgePassage::new(
                    "chunk_004",
                    "Mountain Pose (Tadasana)",
                    "x".repeat(150),
                    "beginner",
                ),
                score: 0.42,
            }],
            verdict,
        }
    }

    #[test]
    fn test_to_response_safe() {
        let response = sample_result(SafetyVerdict::safe()).to_response(DEFAULT_PREVIEW_CHARS);

        assert_eq!(response.answer, "In yoga: something");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].id, "chunk_004");
        assert_eq!(response.sources[0].content_preview.chars().count(), 103);
        assert!(response.sources[0].content_preview.ends_with("..."));
        assert!(response.warning.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("warning").is_none());
        assert_eq!(json["sources"][0]["contentPreview"].as_str().unwrap().len(), 103);
        assert_eq!(json["verdict"]["isUnsafe"], false);
    }

    #[test]
    fn test_to_response_unsafe_has_warning() {
        let verdict = SafetyVerdict::flagged(
            RiskCategory::Pregnancy,
            Severity::High,
            "See a specialist.".to_string(),
        );
        let response = sample_result(verdict).to_response(10);

        let warning = response.warning.unwrap();
        assert_eq!(warning.title, "SAFETY ADVISORY - HIGH RISK");
        assert_eq!(warning.suggestion, "See a specialist.");
        assert_eq!(response.sources.len(), 1);
    }
}
