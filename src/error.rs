//! Classification Errors
//!
//! Every failure is per-record and non-fatal. Callers render them as
//! `Error: <message>`.

use thiserror::Error;

/// Message returned when an input is neither an object nor a flat row.
pub const PARSE_ERROR_MESSAGE: &str =
    "Could not parse activity input—ensure input is a valid single row or object.";

/// Input matched neither accepted format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new() -> Self {
        Self {
            message: PARSE_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for ParseError {
    fn default() -> Self {
        Self::new()
    }
}

/// Record parsed but breaks the required-field or enumerated-value contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid action: {0} (expected one of: allowed, blocked, failed)")]
    InvalidAction(String),

    #[error("Invalid threat_label: {0} (expected one of: benign, suspicious)")]
    InvalidThreatLabel(String),
}

/// Any failure of the parse, validate, classify pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Processing failed: {0}")]
    Processing(String),
}

impl ClassifyError {
    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifyError::Parse(_) => "parse",
            ClassifyError::Validation(_) => "validation",
            ClassifyError::Processing(_) => "processing",
        }
    }
}

/// Errors raised while loading classifier configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown pattern group '{0}'")]
    UnknownGroup(String),

    #[error("invalid pattern in group '{group}': {source}")]
    Pattern {
        group: String,
        #[source]
        source: regex::Error,
    },
}

/// File-level batch failures. Per-record failures stay in the report.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No data rows found in file")]
    NoDataRows,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_lists_every_field() {
        let err =
            ValidationError::MissingFields(vec!["threat_label", "user_agent", "request_path"]);
        assert_eq!(
            err.to_string(),
            "Missing required fields: threat_label, user_agent, request_path"
        );
    }

    #[test]
    fn test_invalid_value_names_field_and_value() {
        let err = ValidationError::InvalidAction("dropped".to_string());
        assert!(err.to_string().contains("action"));
        assert!(err.to_string().contains("dropped"));

        let err = ValidationError::InvalidThreatLabel("unknown".to_string());
        assert!(err.to_string().starts_with("Invalid threat_label: unknown"));
    }

    #[test]
    fn test_classify_error_is_transparent() {
        let err: ClassifyError = ParseError::new().into();
        assert_eq!(err.to_string(), PARSE_ERROR_MESSAGE);
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_empty_batch_message() {
        assert_eq!(BatchError::NoDataRows.to_string(), "No data rows found in file");
    }
}
