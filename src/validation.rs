//! Record Validation
//!
//! Checks required fields and enumerated values, producing a
//! [`ValidatedRecord`] with typed `action` and `threat_label`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::record::ActivityRecord;

/// Fields that must be present and non-empty, in reporting order
pub const REQUIRED_FIELDS: [&str; 6] = [
    "timestamp",
    "source_ip",
    "action",
    "threat_label",
    "user_agent",
    "request_path",
];

/// Outcome recorded by the logging device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allowed,
    Blocked,
    Failed,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allowed => "allowed",
            Action::Blocked => "blocked",
            Action::Failed => "failed",
        }
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allowed" => Ok(Action::Allowed),
            "blocked" => Ok(Action::Blocked),
            "failed" => Ok(Action::Failed),
            _ => Err(ValidationError::InvalidAction(s.to_string())),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label attached upstream by the log source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLabel {
    Benign,
    Suspicious,
}

impl ThreatLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLabel::Benign => "benign",
            ThreatLabel::Suspicious => "suspicious",
        }
    }
}

impl FromStr for ThreatLabel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "benign" => Ok(ThreatLabel::Benign),
            "suspicious" => Ok(ThreatLabel::Suspicious),
            _ => Err(ValidationError::InvalidThreatLabel(s.to_string())),
        }
    }
}

impl std::fmt::Display for ThreatLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that passed validation.
///
/// `dest_ip`, `protocol`, `log_type` and `bytes_transferred` ride along in
/// `record` unchecked; no rule reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    pub action: Action,
    pub threat_label: ThreatLabel,
    record: ActivityRecord,
}

impl ValidatedRecord {
    pub fn record(&self) -> &ActivityRecord {
        &self.record
    }

    pub fn user_agent(&self) -> &str {
        &self.record.user_agent
    }

    pub fn request_path(&self) -> &str {
        &self.record.request_path
    }
}

/// Validate a parsed record.
///
/// Missing fields are reported all at once; only then is `action` checked,
/// then `threat_label`.
pub fn validate(record: ActivityRecord) -> Result<ValidatedRecord, ValidationError> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| record.get(field).map_or(true, str::is_empty))
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let action = record.action.parse::<Action>()?;
    let threat_label = record.threat_label.parse::<ThreatLabel>()?;

    Ok(ValidatedRecord {
        action,
        threat_label,
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_record() -> ActivityRecord {
        ActivityRecord {
            timestamp: "2024-07-31T00:00:00".to_string(),
            source_ip: "177.52.183.80".to_string(),
            action: "blocked".to_string(),
            threat_label: "suspicious".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            request_path: "/login".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_record() {
        let validated = validate(valid_record()).unwrap();
        assert_eq!(validated.action, Action::Blocked);
        assert_eq!(validated.threat_label, ThreatLabel::Suspicious);
        assert_eq!(validated.request_path(), "/login");
    }

    #[test]
    fn test_enumerations_are_case_insensitive() {
        let record = ActivityRecord {
            action: "ALLOWED".to_string(),
            threat_label: "Benign".to_string(),
            ..valid_record()
        };
        let validated = validate(record).unwrap();
        assert_eq!(validated.action, Action::Allowed);
        assert_eq!(validated.threat_label, ThreatLabel::Benign);
    }

    #[test]
    fn test_all_missing_fields_reported() {
        let record = ActivityRecord {
            threat_label: String::new(),
            user_agent: String::new(),
            request_path: String::new(),
            ..valid_record()
        };
        assert_eq!(
            validate(record).unwrap_err(),
            ValidationError::MissingFields(vec!["threat_label", "user_agent", "request_path"])
        );
    }

    #[test]
    fn test_missing_fields_checked_before_values() {
        let record = ActivityRecord {
            action: "bogus".to_string(),
            timestamp: String::new(),
            ..valid_record()
        };
        assert_eq!(
            validate(record).unwrap_err(),
            ValidationError::MissingFields(vec!["timestamp"])
        );
    }

    #[test]
    fn test_invalid_action_reports_raw_value() {
        let record = ActivityRecord {
            action: "Invalid_Action".to_string(),
            ..valid_record()
        };
        assert_eq!(
            validate(record).unwrap_err(),
            ValidationError::InvalidAction("Invalid_Action".to_string())
        );
    }

    #[test]
    fn test_action_checked_before_threat_label() {
        let record = ActivityRecord {
            action: "dropped".to_string(),
            threat_label: "unknown".to_string(),
            ..valid_record()
        };
        assert!(matches!(
            validate(record).unwrap_err(),
            ValidationError::InvalidAction(_)
        ));
    }

    #[test]
    fn test_invalid_threat_label() {
        let record = ActivityRecord {
            threat_label: "invalid_label".to_string(),
            ..valid_record()
        };
        assert_eq!(
            validate(record).unwrap_err(),
            ValidationError::InvalidThreatLabel("invalid_label".to_string())
        );
    }

    #[test]
    fn test_unvalidated_fields_pass_through() {
        let record = ActivityRecord {
            bytes_transferred: "not-a-number".to_string(),
            dest_ip: "???".to_string(),
            ..valid_record()
        };
        let validated = validate(record).unwrap();
        assert_eq!(validated.record().bytes_transferred, "not-a-number");
    }
}
