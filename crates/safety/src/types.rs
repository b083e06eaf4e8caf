//! Verdict types produced by the safety classifier.

use serde::{Deserialize, Serialize};

use crate::rules::MEDICAL_DISCLAIMER;

/// Risk category assigned to a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    #[default]
    None,
    Pregnancy,
    MedicalCondition,
    AdvancedPose,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::None => "none",
            RiskCategory::Pregnancy => "pregnancy",
            RiskCategory::MedicalCondition => "medical_condition",
            RiskCategory::AdvancedPose => "advanced_pose",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strongly an unsafe verdict should be surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    None,
    Low,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::High => "high",
        }
    }

    /// Prefix placed in front of an advisory answer.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Severity::High => Some("HIGH RISK"),
            Severity::Low => Some("NOTE"),
            Severity::None => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a single query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyVerdict {
    pub is_unsafe: bool,
    pub category: RiskCategory,
    pub severity: Severity,
    pub advisory: String,
}

impl SafetyVerdict {
    /// The `none/none` verdict.
    pub fn safe() -> Self {
        Self::default()
    }

    pub fn flagged(category: RiskCategory, severity: Severity, advisory: String) -> Self {
        Self {
            is_unsafe: true,
            category,
            severity,
            advisory,
        }
    }

    /// True when pose suggestions may still be offered alongside the verdict.
    pub fn permits_pose_recommendation(&self) -> bool {
        !self.is_unsafe || self.severity == Severity::Low
    }

    /// User-facing warning block for unsafe verdicts.
    pub fn warning(&self) -> Option<SafetyWarning> {
        if !self.is_unsafe {
            return None;
        }

        let title = match self.severity {
            Severity::Low => "Safety Note",
            Severity::High | Severity::None => "SAFETY ADVISORY - HIGH RISK",
        };

        Some(SafetyWarning {
            title: title.to_string(),
            message: "Your question touches on an area that can be risky without personalized guidance."
                .to_string(),
            suggestion: self.advisory.clone(),
            disclaimer: MEDICAL_DISCLAIMER.to_string(),
        })
    }
}

/// Display-ready summary of an unsafe verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyWarning {
    pub title: String,
    pub message: String,
    pub suggestion: String,
    pub disclaimer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_verdict() {
        let verdict = SafetyVerdict::safe();
        assert!(!verdict.is_unsafe);
        assert_eq!(verdict.category, RiskCategory::None);
        assert_eq!(verdict.severity, Severity::None);
        assert!(verdict.advisory.is_empty());
        assert!(verdict.warning().is_none());
        assert!(verdict.permits_pose_recommendation());
    }

    #[test]
    fn test_warning_titles() {
        let high = SafetyVerdict::flagged(
            RiskCategory::Pregnancy,
            Severity::High,
            "see a specialist".to_string(),
        );
        let warning = high.warning().unwrap();
        assert_eq!(warning.title, "SAFETY ADVISORY - HIGH RISK");
        assert_eq!(warning.suggestion, "see a specialist");
        assert_eq!(warning.disclaimer, MEDICAL_DISCLAIMER);
        assert!(!high.permits_pose_recommendation());

        let low = SafetyVerdict::flagged(
            RiskCategory::AdvancedPose,
            Severity::Low,
            "use a wall".to_string(),
        );
        assert_eq!(low.warning().unwrap().title, "Safety Note");
        assert!(low.permits_pose_recommendation());
    }

    #[test]
    fn test_serialization_shape() {
        let verdict = SafetyVerdict::flagged(
            RiskCategory::MedicalCondition,
            Severity::High,
            "careful".to_string(),
        );
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["isUnsafe"], true);
        assert_eq!(json["category"], "medical_condition");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["advisory"], "careful");
    }

    #[test]
    fn test_severity_marker() {
        assert_eq!(Severity::High.marker(), Some("HIGH RISK"));
        assert_eq!(Severity::Low.marker(), Some("NOTE"));
        assert_eq!(Severity::None.marker(), None);
    }
}
