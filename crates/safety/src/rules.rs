//! Ordered rule table for risk screening.
//!
//! Rules are evaluated top to bottom against the lowercased, trimmed query
//! using plain substring containment. The first rule that fires decides the
//! verdict.

use crate::types::{RiskCategory, Severity};

/// Appended to every medical-condition advisory and carried by each warning.
pub const MEDICAL_DISCLAIMER: &str = "⚠️ IMPORTANT: This information is not medical advice. Please consult a doctor or certified yoga therapist before attempting any yoga poses, especially if you have health concerns.";

/// Phrases that mark a query as asking for instructions.
pub const INSTRUCTIONAL_MARKERS: [&str; 3] = ["how to", "perform", "do"];

const PREGNANCY_KEYWORDS: &[&str] = &[
    "pregnant",
    "pregnancy",
    "trimester",
    "expecting",
    "baby",
    "gestation",
    "maternity",
    "postpartum",
    "prenatal",
    "antenatal",
    "conception",
    "fertility",
];

const MEDICAL_KEYWORDS: &[&str] = &[
    "hernia",
    "glaucoma",
    "blood pressure",
    "hypertension",
    "surgery",
    "operation",
    "injury",
    "fracture",
    "sprain",
    "heart condition",
    "cardiac",
    "migraine",
    "vertigo",
    "osteoporosis",
    "arthritis",
    "carpal tunnel",
    "sciatica",
    "diabetes",
    "asthma",
    "epilepsy",
    "cancer",
    "tumor",
    "high bp",
    "low bp",
    "bp problem",
    "recent surgery",
];

const ADVANCED_POSES: &[&str] = &[
    "headstand",
    "shoulderstand",
    "handstand",
    "wheel",
    "scorpion",
    "plow",
];

/// Pose to safer alternative, scanned in order.
const SAFE_ALTERNATIVES: &[(&str, &str)] = &[
    (
        "headstand",
        "Consider gentle supine poses like Legs-Up-The-Wall (Viparita Karani)",
    ),
    ("shoulderstand", "Try gentle neck stretches and bridge pose instead"),
    (
        "backbend",
        "Focus on gentle chest opening with supported fish pose",
    ),
    ("inversion", "Practice forward folds or gentle twists"),
    (
        "advanced pose",
        "Start with beginner variations and build gradually",
    ),
    ("hot yoga", "Try gentle hatha yoga at room temperature"),
    ("power yoga", "Consider gentle vinyasa or restorative yoga"),
];

const PREGNANCY_ADVISORY: &str = "Yoga during pregnancy requires special guidance. Please consult with a prenatal yoga specialist and your healthcare provider. Safe options may include: prenatal yoga classes, meditation, and gentle breathing exercises.";

const MEDICAL_PREAMBLE: &str =
    "Your question mentions a health condition that requires professional guidance.";

const ADVANCED_POSE_ADVISORY: &str = "{pose} is an advanced pose that requires proper preparation and guidance. Consider starting with beginner variations and working with a certified yoga instructor. Always use a spotter or wall support when first attempting inversions.";

/// Extra condition a rule needs beyond a keyword hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Any keyword hit fires the rule.
    Any,
    /// A keyword hit fires only if one of these markers is also present.
    WithIntent(Vec<String>),
}

/// Advisory text attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    Fixed(String),
    /// Preamble, then the first alternative whose pose appears in the query,
    /// then the closing text.
    WithAlternatives {
        preamble: String,
        alternatives: Vec<(String, String)>,
        closing: String,
    },
    /// Template where `{pose}` becomes the matched keyword as written.
    PerKeyword(String),
}

impl Advisory {
    /// Render the advisory for a normalized query and the keyword that fired.
    pub fn render(&self, query: &str, keyword: &str) -> String {
        match self {
            Advisory::Fixed(text) => text.clone(),
            Advisory::WithAlternatives {
                preamble,
                alternatives,
                closing,
            } => {
                let mut text = format!("{} ", preamble);
                if let Some((pose, alternative)) = alternatives
                    .iter()
                    .find(|(pose, _)| query.contains(pose.as_str()))
                {
                    text.push_str(&format!("Instead of {}, consider: {}. ", pose, alternative));
                }
                text.push_str(closing);
                text
            }
            Advisory::PerKeyword(template) => template.replace("{pose}", keyword),
        }
    }
}

/// A single row of the rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyRule {
    pub category: RiskCategory,
    pub severity: Severity,
    pub keywords: Vec<String>,
    pub trigger: Trigger,
    pub advisory: Advisory,
}

impl SafetyRule {
    /// Return the first keyword that fires this rule for a normalized query.
    pub fn matched_keyword(&self, query: &str) -> Option<&str> {
        if let Trigger::WithIntent(markers) = &self.trigger {
            if !markers.iter().any(|m| query.contains(m.as_str())) {
                return None;
            }
        }

        self.keywords
            .iter()
            .map(String::as_str)
            .find(|keyword| query.contains(*keyword))
    }
}

/// The built-in table: pregnancy, then medical conditions, then advanced poses.
pub fn default_rules() -> Vec<SafetyRule> {
    vec![
        SafetyRule {
            category: RiskCategory::Pregnancy,
            severity: Severity::High,
            keywords: to_strings(PREGNANCY_KEYWORDS),
            trigger: Trigger::Any,
            advisory: Advisory::Fixed(PREGNANCY_ADVISORY.to_string()),
        },
        SafetyRule {
            category: RiskCategory::MedicalCondition,
            severity: Severity::High,
            keywords: to_strings(MEDICAL_KEYWORDS),
            trigger: Trigger::Any,
            advisory: Advisory::WithAlternatives {
                preamble: MEDICAL_PREAMBLE.to_string(),
                alternatives: SAFE_ALTERNATIVES
                    .iter()
                    .map(|(pose, alt)| (pose.to_string(), alt.to_string()))
                    .collect(),
                closing: MEDICAL_DISCLAIMER.to_string(),
            },
        },
        SafetyRule {
            category: RiskCategory::AdvancedPose,
            severity: Severity::Low,
            keywords: to_strings(ADVANCED_POSES),
            trigger: Trigger::WithIntent(to_strings(&INSTRUCTIONAL_MARKERS)),
            advisory: Advisory::PerKeyword(ADVANCED_POSE_ADVISORY.to_string()),
        },
    ]
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
