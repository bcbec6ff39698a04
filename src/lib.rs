//! Zentinel Activity Classifier
//!
//! Rule-based classification of single network and application activity log
//! records. Each record is judged malicious or non-malicious; malicious
//! records get an attack-type label and a justification.
//!
//! # Pipeline
//!
//! raw string → [`parser`] → [`validation`] → [`engine`] → [`verdict`]
//!
//! Any stage may fail, which short-circuits the rest. Classification is
//! synchronous and holds no state between calls; one [`ActivityClassifier`]
//! can be shared by any number of threads.
//!
//! # Example
//!
//! ```
//! use zentinel_activity_classifier::classify_activity;
//!
//! let row = r#"2024-07-31T00:00:00,177.52.183.80,192.168.1.50,HTTPS,blocked,suspicious,ids,45164,"Mozilla/5.0",/login?backup.sql"#;
//! let outcome = classify_activity(row);
//! assert!(outcome.success);
//! assert!(outcome.text.starts_with("Activity status: Malicious"));
//! ```

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod patterns;
pub mod record;
pub mod validation;
pub mod verdict;

// Re-exports for convenience
pub use batch::{BatchEntry, BatchFormat, BatchReport, BatchSummary};
pub use config::{ClassifierConfig, ClassifierConfigJson, PatternExtensions};
pub use engine::{Rule, RuleEngine};
pub use error::{BatchError, ClassifyError, ConfigError, ParseError, ValidationError};
pub use patterns::{AttackType, PatternTable};
pub use record::ActivityRecord;
pub use validation::{Action, ThreatLabel, ValidatedRecord};
pub use verdict::{
    format_result, parse_structured_fields, ClassificationOutcome, ClassificationResult, Status,
    StructuredFields,
};

use anyhow::Result;
use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;
use tracing::{debug, info};

/// Classifier over the built-in pattern table, created on first use
static DEFAULT_CLASSIFIER: LazyLock<ActivityClassifier> = LazyLock::new(|| {
    ActivityClassifier::new(ClassifierConfig::default())
        .expect("built-in pattern table must compile")
});

/// Classify one raw record with the built-in pattern table
pub fn classify_activity(raw: &str) -> ClassificationOutcome {
    DEFAULT_CLASSIFIER.classify_activity(raw)
}

/// Shared default classifier
pub fn default_classifier() -> &'static ActivityClassifier {
    &DEFAULT_CLASSIFIER
}

/// Activity classifier - owns the immutable pattern table and rule engine
#[derive(Debug, Clone)]
pub struct ActivityClassifier {
    engine: RuleEngine,
    config: ClassifierConfig,
}

impl ActivityClassifier {
    /// Create a classifier with the given configuration
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let table = PatternTable::with_extensions(&config.patterns)?;

        info!(
            pattern_groups = table.groups().len(),
            suspicious_agents = table.suspicious_agents().count(),
            extended = !config.patterns.is_empty(),
            "Activity classifier initialized"
        );

        Ok(Self {
            engine: RuleEngine::new(table),
            config,
        })
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn table(&self) -> &PatternTable {
        self.engine.table()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Parse a raw row or object
    pub fn parse(&self, raw: &str) -> Result<ActivityRecord, ParseError> {
        parser::parse(raw)
    }

    /// Validate a parsed record
    pub fn validate(&self, record: ActivityRecord) -> Result<ValidatedRecord, ValidationError> {
        validation::validate(record)
    }

    /// Run the rule engine on a validated record
    pub fn classify_record(&self, record: &ValidatedRecord) -> ClassificationResult {
        self.engine.classify(record)
    }

    /// Full pipeline for one raw input
    pub fn process(&self, raw: &str) -> Result<ClassificationResult, ClassifyError> {
        let record = self.parse(raw)?;
        let validated = self.validate(record)?;

        panic::catch_unwind(AssertUnwindSafe(|| self.classify_record(&validated)))
            .map_err(|payload| ClassifyError::Processing(panic_message(payload.as_ref())))
    }

    /// Full pipeline, rendered for callers
    pub fn classify_activity(&self, raw: &str) -> ClassificationOutcome {
        let result = self.process(raw);
        if let Err(error) = &result {
            debug!(kind = error.kind(), error = %error, "Activity classification failed");
        }
        result.into()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unexpected internal error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MALICIOUS_ROW: &str = r#"2024-07-31T00:00:00,177.52.183.80,192.168.1.50,HTTPS,blocked,suspicious,ids,45164,"Mozilla/5.0",/login?backup.sql"#;

    #[test]
    fn test_process_row() {
        let classifier = ActivityClassifier::new(ClassifierConfig::default()).unwrap();
        let result = classifier.process(MALICIOUS_ROW).unwrap();
        assert_eq!(result.status(), Status::Malicious);
        assert_eq!(result.attack_type(), Some(AttackType::BackupAccess));
    }

    #[test]
    fn test_process_reports_stage() {
        let classifier = default_classifier();
        assert!(matches!(classifier.process("nonsense"), Err(ClassifyError::Parse(_))));
        assert!(matches!(
            classifier.process(r#"{"action": "blocked"}"#),
            Err(ClassifyError::Validation(ValidationError::MissingFields(_)))
        ));
    }

    #[test]
    fn test_classify_activity_outcome() {
        let outcome = classify_activity(MALICIOUS_ROW);
        assert!(outcome.success);
        assert_eq!(outcome.status, Some(Status::Malicious));
        assert_eq!(outcome.attack_type.as_deref(), Some("Unauthorized backup access"));
        assert!(outcome.reason.unwrap().contains("suspicious"));
    }

    #[test]
    fn test_error_outcome_text() {
        let outcome = classify_activity("");
        assert!(!outcome.success);
        assert_eq!(
            outcome.text,
            "Error: Could not parse activity input—ensure input is a valid single row or object."
        );
    }

    #[test]
    fn test_configured_classifier() {
        let config = ClassifierConfig {
            patterns: PatternExtensions {
                scanner_agents: vec!["masscan".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let classifier = ActivityClassifier::new(config).unwrap();
        let outcome = classifier.classify_activity(
            r#"{"timestamp":"t","source_ip":"s","action":"blocked","threat_label":"benign","user_agent":"masscan","request_path":"/"}"#,
        );
        assert_eq!(outcome.attack_type.as_deref(), Some("Network reconnaissance"));
    }

    #[test]
    fn test_panic_message_payloads() {
        let static_str: Box<dyn std::any::Any + Send> = Box::new("pattern table poisoned");
        assert_eq!(panic_message(static_str.as_ref()), "pattern table poisoned");

        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("index out of bounds"));
        assert_eq!(panic_message(owned.as_ref()), "index out of bounds");

        let other: Box<dyn std::any::Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(other.as_ref()), "unexpected internal error");
    }

    #[test]
    fn test_processing_error_outcome() {
        let error = ClassifyError::Processing("index out of bounds".to_string());
        assert_eq!(error.kind(), "processing");

        let outcome = ClassificationOutcome::from(&error);
        assert!(!outcome.success);
        assert_eq!(outcome.text, "Error: Processing failed: index out of bounds");
        assert_eq!(outcome.status, None);
        assert_eq!(outcome.attack_type, None);
        assert_eq!(outcome.reason, None);
        assert_eq!(outcome.error_message(), Some("Processing failed: index out of bounds"));
    }

    #[test]
    fn test_classifier_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ActivityClassifier>();
    }
}
