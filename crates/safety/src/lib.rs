//! Asana Safety Library
//!
//! Keyword-based risk screening for yoga questions. A [`SafetyClassifier`]
//! walks an ordered rule table and returns the first matching
//! [`SafetyVerdict`]. Unsafe verdicts replace the normal answer with an
//! advisory.

pub mod classifier;
pub mod rules;
pub mod types;

pub use classifier::SafetyClassifier;
pub use rules::{default_rules, Advisory, SafetyRule, Trigger, MEDICAL_DISCLAIMER};
pub use types::{RiskCategory, SafetyVerdict, SafetyWarning, Severity};
