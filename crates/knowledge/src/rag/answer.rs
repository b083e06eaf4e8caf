//! Template-based answer synthesis.
//!
//! Answers are built only from the safety verdict and the top-ranked passage,
//! so every sentence traces back to a source or an advisory.

use crate::types::RetrievedMatch;
use asana_safety::SafetyVerdict;
use handlebars::Handlebars;
use serde_json::json;

/// Shown when an unsafe verdict carries no advisory text.
pub const DEFAULT_ADVISORY: &str = "Please consult a certified yoga therapist or doctor.";

/// Shown when retrieval found nothing.
pub const NO_INFORMATION_ANSWER: &str = "I don't have specific information about that in my yoga knowledge base. Try asking about common poses like Downward Dog or benefits of yoga.";

const SAFETY_TEMPLATE: &str = "{{marker}} - {{advisory}}";
const BENEFIT_TEMPLATE: &str = "According to yoga teachings: {{content}} Regular practice provides these benefits and promotes overall wellbeing.";
const INSTRUCTIONAL_TEMPLATE: &str =
    "To practice safely: {{content}} Remember to breathe deeply and listen to your body.";
const DEFINITIONAL_TEMPLATE: &str = "In yoga: {{content}}";
const GENERAL_TEMPLATE: &str = "Based on yoga knowledge: {{content}}";

/// Lexical intent of a safe query, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerIntent {
    Benefit,
    Instructional,
    Definitional,
    General,
}

impl AnswerIntent {
    const MARKERS: [(AnswerIntent, &'static [&'static str]); 3] = [
        (AnswerIntent::Benefit, &["benefit", "good for", "advantage"]),
        (AnswerIntent::Instructional, &["how to", "perform", "do "]),
        (AnswerIntent::Definitional, &["what is", "define"]),
    ];

    /// First intent whose marker appears in the query.
    pub fn detect(query: &str) -> Self {
        let lower = query.to_lowercase();
        Self::MARKERS
            .iter()
            .find(|(_, markers)| markers.iter().any(|m| lower.contains(*m)))
            .map(|(intent, _)| *intent)
            .unwrap_or(AnswerIntent::General)
    }

    fn template_name(self) -> &'static str {
        match self {
            AnswerIntent::Benefit => "benefit",
            AnswerIntent::Instructional => "instructional",
            AnswerIntent::Definitional => "definitional",
            AnswerIntent::General => "general",
        }
    }
}

/// Turns a verdict and ranked matches into answer text.
pub struct AnswerSynthesizer {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for AnswerSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerSynthesizer").finish_non_exhaustive()
    }
}

impl Default for AnswerSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerSynthesizer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();

        // Answers are plain text
        registry.register_escape_fn(handlebars::no_escape);

        for (name, template) in [
            ("safety", SAFETY_TEMPLATE),
            ("benefit", BENEFIT_TEMPLATE),
            ("instructional", INSTRUCTIONAL_TEMPLATE),
            ("definitional", DEFINITIONAL_TEMPLATE),
            ("general", GENERAL_TEMPLATE),
        ] {
            if let Err(e) = registry.register_template_string(name, template) {
                tracing::warn!("Failed to register answer template '{}': {}", name, e);
            }
        }

        Self { registry }
    }

    /// Produce the answer text. Never fails.
    pub fn synthesize(
        &self,
        query: &str,
        verdict: &SafetyVerdict,
        matches: &[RetrievedMatch],
    ) -> String {
        if verdict.is_unsafe {
            return self.safety_answer(verdict);
        }

        let Some(top) = matches.first() else {
            return NO_INFORMATION_ANSWER.to_string();
        };

        let intent = AnswerIntent::detect(query);
        tracing::debug!(?intent, passage = %top.passage.id, "Synthesizing answer");

        let content = &top.passage.content;
        self.render(intent.template_name(), &json!({ "content": content }))
            .unwrap_or_else(|| format!("Based on yoga knowledge: {}", content))
    }

    fn safety_answer(&self, verdict: &SafetyVerdict) -> String {
        // A flagged verdict without a severity is treated as high risk
        let marker = verdict.severity.marker().unwrap_or("HIGH RISK");
        let advisory = if verdict.advisory.trim().is_empty() {
            DEFAULT_ADVISORY
        } else {
            verdict.advisory.as_str()
        };

        self.render(
            "safety",
            &json!({ "marker": marker, "advisory": advisory }),
        )
        .unwrap_or_else(|| format!("{} - {}", marker, advisory))
    }

    fn render(&self, name: &str, data: &serde_json::Value) -> Option<String> {
        match self.registry.render(name, data) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Failed to render answer template '{}': {}", name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnowledgePassage;
    use asana_safety::{RiskCategory, Severity};

    fn matches(content: &str) -> Vec<RetrievedMatch> {
        vec![RetrievedMatch {
            passage: KnowledgePassage::new("p1", "Title", content, "general"),
            score: 0.5,
        }]
    }

    #[test]
    fn test_intent_detection() {
        assert_eq!(AnswerIntent::detect("What are the benefits of yoga?"), AnswerIntent::Benefit);
        assert_eq!(AnswerIntent::detect("Is yoga GOOD FOR sleep"), AnswerIntent::Benefit);
        assert_eq!(AnswerIntent::detect("How to do downward dog?"), AnswerIntent::Instructional);
        assert_eq!(AnswerIntent::detect("What is mountain pose?"), AnswerIntent::Definitional);
        assert_eq!(AnswerIntent::detect("child pose"), AnswerIntent::General);
        // Benefit wins over instructional
        assert_eq!(AnswerIntent::detect("how to get the benefits"), AnswerIntent::Benefit);
        // "do" needs a trailing space here
        assert_eq!(AnswerIntent::detect("downward dog"), AnswerIntent::General);
    }

    #[test]
    fn test_templates() {
        let synthesizer = AnswerSynthesizer::new();
        let safe = SafetyVerdict::safe();

        assert_eq!(
            synthesizer.synthesize("benefits?", &safe, &matches("Improves <balance> & focus.")),
            "According to yoga teachings: Improves <balance> & focus. Regular practice provides these benefits and promotes overall wellbeing."
        );
        assert_eq!(
            synthesizer.synthesize("how to plank", &safe, &matches("Hold still.")),
            "To practice safely: Hold still. Remember to breathe deeply and listen to your body."
        );
        assert_eq!(
            synthesizer.synthesize("define asana", &safe, &matches("A posture.")),
            "In yoga: A posture."
        );
        assert_eq!(
            synthesizer.synthesize("plank", &safe, &matches("Hold still.")),
            "Based on yoga knowledge: Hold still."
        );
    }

    #[test]
    fn test_no_matches() {
        let synthesizer = AnswerSynthesizer::new();
        let answer = synthesizer.synthesize("anything", &SafetyVerdict::safe(), &[]);
        assert_eq!(answer, NO_INFORMATION_ANSWER);
    }

    #[test]
    fn test_unsafe_markers() {
        let synthesizer = AnswerSynthesizer::new();

        let high = SafetyVerdict::flagged(RiskCategory::Pregnancy, Severity::High, "Careful.".to_string());
        assert_eq!(
            synthesizer.synthesize("q", &high, &matches("ignored")),
            "HIGH RISK - Careful."
        );

        let low = SafetyVerdict::flagged(RiskCategory::AdvancedPose, Severity::Low, "Use a wall.".to_string());
        assert_eq!(synthesizer.synthesize("q", &low, &[]), "NOTE - Use a wall.");

        let empty = SafetyVerdict::flagged(RiskCategory::MedicalCondition, Severity::High, String::new());
        assert_eq!(
            synthesizer.synthesize("q", &empty, &[]),
            format!("HIGH RISK - {}", DEFAULT_ADVISORY)
        );
    }
}
