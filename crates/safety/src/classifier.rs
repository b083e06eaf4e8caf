//! Rule-table safety classifier.

use crate::rules::{default_rules, SafetyRule};
use crate::types::SafetyVerdict;

/// Screens queries against an ordered rule table.
#[derive(Debug, Clone)]
pub struct SafetyClassifier {
    rules: Vec<SafetyRule>,
}

impl Default for SafetyClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyClassifier {
    /// Classifier with the built-in rule table.
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Classifier with a custom rule table, evaluated in the given order.
    pub fn with_rules(rules: Vec<SafetyRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SafetyRule] {
        &self.rules
    }

    /// Classify a query. The first rule that fires wins; no rule gives the
    /// `none/none` verdict.
    pub fn classify(&self, query: &str) -> SafetyVerdict {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return SafetyVerdict::safe();
        }

        for rule in &self.rules {
            if let Some(keyword) = rule.matched_keyword(&normalized) {
                tracing::debug!(
                    category = %rule.category,
                    severity = %rule.severity,
                    keyword,
                    "Safety rule matched"
                );
                let advisory = rule.advisory.render(&normalized, keyword);
                return SafetyVerdict::flagged(rule.category, rule.severity, advisory);
            }
        }

        SafetyVerdict::safe()
    }

    /// Shorthand for `classify(query).permits_pose_recommendation()`.
    pub fn is_safe_for_pose_recommendation(&self, query: &str) -> bool {
        self.classify(query).permits_pose_recommendation()
    }
}
