//! Classification Verdicts
//!
//! The decision produced for one record, its fixed three-line text form,
//! and the serializable outcome handed to callers.

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::patterns::AttackType;

pub const STATUS_PREFIX: &str = "Activity status: ";
pub const ATTACK_TYPE_PREFIX: &str = "Type of attack: ";
pub const REASON_PREFIX: &str = "Reason: ";
pub const ERROR_PREFIX: &str = "Error: ";

/// Attack-type text printed for non-malicious records
pub const NO_ATTACK: &str = "None";

/// Malicious or not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Malicious,
    #[serde(rename = "Non-malicious")]
    NonMalicious,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Malicious => "Malicious",
            Status::NonMalicious => "Non-malicious",
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "Malicious" => Some(Status::Malicious),
            "Non-malicious" => Some(Status::NonMalicious),
            _ => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision for one record. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    status: Status,
    attack_type: Option<AttackType>,
    reason: String,
}

impl ClassificationResult {
    pub fn malicious(attack_type: AttackType, reason: impl Into<String>) -> Self {
        Self {
            status: Status::Malicious,
            attack_type: Some(attack_type),
            reason: reason.into(),
        }
    }

    pub fn non_malicious(reason: impl Into<String>) -> Self {
        Self {
            status: Status::NonMalicious,
            attack_type: None,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// `None` exactly when the record is non-malicious
    pub fn attack_type(&self) -> Option<AttackType> {
        self.attack_type
    }

    /// Attack-type label, or `"None"`
    pub fn attack_type_label(&self) -> &'static str {
        self.attack_type.map_or(NO_ATTACK, |t| t.label())
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_malicious(&self) -> bool {
        self.status == Status::Malicious
    }
}

/// Renders the three-line contract
impl std::fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}\n{}{}\n{}{}",
            STATUS_PREFIX,
            self.status,
            ATTACK_TYPE_PREFIX,
            self.attack_type_label(),
            REASON_PREFIX,
            self.reason
        )
    }
}

/// Render a result as its three-line text
pub fn format_result(result: &ClassificationResult) -> String {
    result.to_string()
}

/// Fields recovered from three-line text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredFields {
    pub status: Status,
    /// `"None"` for non-malicious records
    pub attack_type: String,
    pub reason: String,
}

/// Recover status, attack type and reason by stripping the literal prefixes.
///
/// Returns `None` unless the text is exactly three lines carrying the
/// expected prefixes and a known status.
pub fn parse_structured_fields(text: &str) -> Option<StructuredFields> {
    let mut lines = text.split('\n');
    let status = lines.next()?.strip_prefix(STATUS_PREFIX)?;
    let attack_type = lines.next()?.strip_prefix(ATTACK_TYPE_PREFIX)?;
    let reason = lines.next()?.strip_prefix(REASON_PREFIX)?;
    if lines.next().is_some() {
        return None;
    }

    Some(StructuredFields {
        status: Status::from_text(status)?,
        attack_type: attack_type.to_string(),
        reason: reason.to_string(),
    })
}

/// Caller-facing result of classifying one raw input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationOutcome {
    pub success: bool,
    /// Three-line text on success, `Error: <message>` on failure
    pub text: String,
    pub status: Option<Status>,
    pub attack_type: Option<String>,
    pub reason: Option<String>,
}

impl ClassificationOutcome {
    pub fn is_malicious(&self) -> bool {
        self.status == Some(Status::Malicious)
    }

    /// Error message without the `Error: ` prefix
    pub fn error_message(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        Some(self.text.strip_prefix(ERROR_PREFIX).unwrap_or(&self.text))
    }
}

impl From<&ClassificationResult> for ClassificationOutcome {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            success: true,
            text: format_result(result),
            status: Some(result.status()),
            attack_type: Some(result.attack_type_label().to_string()),
            reason: Some(result.reason().to_string()),
        }
    }
}

impl From<&ClassifyError> for ClassificationOutcome {
    fn from(error: &ClassifyError) -> Self {
        Self {
            success: false,
            text: format!("{}{}", ERROR_PREFIX, error),
            status: None,
            attack_type: None,
            reason: None,
        }
    }
}

impl From<Result<ClassificationResult, ClassifyError>> for ClassificationOutcome {
    fn from(result: Result<ClassificationResult, ClassifyError>) -> Self {
        match result {
            Ok(result) => (&result).into(),
            Err(error) => (&error).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    #[test]
    fn test_malicious_format() {
        let result = ClassificationResult::malicious(
            AttackType::BackupAccess,
            "Event labeled as 'suspicious' with indicators: unauthorized backup access",
        );
        assert_eq!(
            format_result(&result),
            "Activity status: Malicious\n\
             Type of attack: Unauthorized backup access\n\
             Reason: Event labeled as 'suspicious' with indicators: unauthorized backup access"
        );
    }

    #[test]
    fn test_non_malicious_format() {
        let result = ClassificationResult::non_malicious("routine");
        let text = format_result(&result);
        assert_eq!(text.lines().count(), 3);
        assert_eq!(text.lines().nth(1), Some("Type of attack: None"));
        assert!(result.attack_type().is_none());
    }

    #[test]
    fn test_structured_fields_recovered() {
        let result = ClassificationResult::malicious(AttackType::PathTraversal, "why: a, b");
        let fields = parse_structured_fields(&format_result(&result)).unwrap();
        assert_eq!(fields.status, Status::Malicious);
        assert_eq!(fields.attack_type, "Path traversal attempt");
        assert_eq!(fields.reason, "why: a, b");
    }

    #[test]
    fn test_structured_fields_rejects_other_text() {
        assert!(parse_structured_fields("Error: nope").is_none());
        assert!(
            parse_structured_fields("Activity status: Maybe\nType of attack: None\nReason: x")
                .is_none()
        );
        assert!(
            parse_structured_fields("Activity status: Malicious\nType of attack: None").is_none()
        );
        assert!(parse_structured_fields(
            "Activity status: Malicious\nType of attack: None\nReason: x\nextra"
        )
        .is_none());
    }

    #[test]
    fn test_outcome_from_error() {
        let error = ClassifyError::from(ParseError::new());
        let outcome = ClassificationOutcome::from(&error);
        assert!(!outcome.success);
        assert!(outcome.text.starts_with("Error: Could not parse"));
        assert_eq!(outcome.status, None);
        assert!(outcome.error_message().unwrap().starts_with("Could not parse"));
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let result = ClassificationResult::non_malicious("routine");
        let outcome = ClassificationOutcome::from(&result);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "Non-malicious");
        assert_eq!(json["attackType"], "None");
        assert_eq!(json["success"], true);
    }
}
