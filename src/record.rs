//! Activity Record
//!
//! The fixed-shape record every input format normalizes into.

use serde::{Deserialize, Serialize};

/// Positional order of the ten fields in a flat row.
pub const FIELD_ORDER: [&str; 10] = [
    "timestamp",
    "source_ip",
    "dest_ip",
    "protocol",
    "action",
    "threat_label",
    "log_type",
    "bytes_transferred",
    "user_agent",
    "request_path",
];

/// One normalized activity observation.
///
/// Every field is a string. A field the source did not provide is the
/// empty string, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub timestamp: String,
    pub source_ip: String,
    pub dest_ip: String,
    pub protocol: String,
    pub action: String,
    pub threat_label: String,
    pub log_type: String,
    pub bytes_transferred: String,
    pub user_agent: String,
    pub request_path: String,
}

impl ActivityRecord {
    /// Build a record from ten values in [`FIELD_ORDER`]
    pub fn from_fields(fields: [String; 10]) -> Self {
        let [
            timestamp,
            source_ip,
            dest_ip,
            protocol,
            action,
            threat_label,
            log_type,
            bytes_transferred,
            user_agent,
            request_path,
        ] = fields;
        Self {
            timestamp,
            source_ip,
            dest_ip,
            protocol,
            action,
            threat_label,
            log_type,
            bytes_transferred,
            user_agent,
            request_path,
        }
    }

    /// Look up a field by name
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "timestamp" => &self.timestamp,
            "source_ip" => &self.source_ip,
            "dest_ip" => &self.dest_ip,
            "protocol" => &self.protocol,
            "action" => &self.action,
            "threat_label" => &self.threat_label,
            "log_type" => &self.log_type,
            "bytes_transferred" => &self.bytes_transferred,
            "user_agent" => &self.user_agent,
            "request_path" => &self.request_path,
            _ => return None,
        };
        Some(value.as_str())
    }
}
