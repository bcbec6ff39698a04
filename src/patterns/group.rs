//! Attack types, pattern groups and keyword sets
//!
//! Defines the closed set of attack-type labels, the regex-backed
//! [`PatternGroup`] with a builder, and the substring [`KeywordSet`] used by
//! rule conditions.

use regex::{RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};

/// Attack type assigned to a malicious record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    BackupAccess,
    PathTraversal,
    PrivilegeEscalation,
    SuspiciousLogin,
    MalwareUpload,
    SqlInjection,
    NetworkReconnaissance,
    /// Malicious, but no more specific indicator matched
    SuspiciousActivity,
}

impl AttackType {
    /// Human-readable label used in the output contract
    pub fn label(&self) -> &'static str {
        match self {
            AttackType::BackupAccess => "Unauthorized backup access",
            AttackType::PathTraversal => "Path traversal attempt",
            AttackType::PrivilegeEscalation => "Privilege escalation attempt",
            AttackType::SuspiciousLogin => "Suspicious login attempt",
            AttackType::MalwareUpload => "Malware upload attempt",
            AttackType::SqlInjection => "SQL injection attempt",
            AttackType::NetworkReconnaissance => "Network reconnaissance",
            AttackType::SuspiciousActivity => "Suspicious activity",
        }
    }

    /// Name of the pattern group that selects this type, if any
    pub fn group_name(&self) -> Option<&'static str> {
        match self {
            AttackType::BackupAccess => Some("backup_access"),
            AttackType::PathTraversal => Some("path_traversal"),
            AttackType::PrivilegeEscalation => Some("admin_privilege"),
            AttackType::SuspiciousLogin => Some("login_brute_force"),
            AttackType::MalwareUpload => Some("malware_upload"),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Named set of regexes over the request path that selects one attack type
#[derive(Debug, Clone)]
pub struct PatternGroup {
    /// Attack type reported when any pattern matches
    pub attack_type: AttackType,
    /// Whether matching respects case
    pub case_sensitive: bool,
    /// Raw pattern strings, kept for extension and diagnostics
    pub patterns: Vec<String>,
    set: RegexSet,
}

impl PatternGroup {
    /// Group name used as the lookup key
    pub fn name(&self) -> &'static str {
        self.attack_type.group_name().unwrap_or("unnamed")
    }

    /// True if any pattern matches somewhere in `haystack`
    pub fn is_match(&self, haystack: &str) -> bool {
        self.set.is_match(haystack)
    }

    /// Raw patterns that matched `haystack`
    pub fn matching_patterns<'a>(&'a self, haystack: &str) -> Vec<&'a str> {
        self.set
            .matches(haystack)
            .into_iter()
            .map(|idx| self.patterns[idx].as_str())
            .collect()
    }
}

/// Builder for pattern groups
pub struct PatternGroupBuilder {
    attack_type: AttackType,
    case_sensitive: bool,
    patterns: Vec<String>,
}

impl PatternGroupBuilder {
    /// Start a case-insensitive group for an attack type
    pub fn new(attack_type: AttackType) -> Self {
        Self {
            attack_type,
            case_sensitive: false,
            patterns: vec![],
        }
    }

    /// Start from an existing group, keeping its patterns and case rule
    pub fn from_group(group: &PatternGroup) -> Self {
        Self {
            attack_type: group.attack_type,
            case_sensitive: group.case_sensitive,
            patterns: group.patterns.clone(),
        }
    }

    /// Set case sensitivity
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Add one regex pattern
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.to_string());
        self
    }

    /// Add several regex patterns
    pub fn patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        self.patterns
            .extend(patterns.iter().map(|p| p.as_ref().to_string()));
        self
    }

    /// Compile the group
    pub fn build(self) -> Result<PatternGroup, regex::Error> {
        let set = RegexSetBuilder::new(&self.patterns)
            .case_insensitive(!self.case_sensitive)
            .build()?;
        Ok(PatternGroup {
            attack_type: self.attack_type,
            case_sensitive: self.case_sensitive,
            patterns: self.patterns,
            set,
        })
    }
}

/// Plain substring keywords used by rule conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    pub case_sensitive: bool,
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Case-insensitive keyword set
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            case_sensitive: false,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Keyword set matched with exact case
    pub fn case_sensitive(keywords: &[&str]) -> Self {
        Self {
            case_sensitive: true,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// True if any keyword occurs in `haystack`
    pub fn matches(&self, haystack: &str) -> bool {
        if self.case_sensitive {
            self.keywords.iter().any(|k| haystack.contains(k.as_str()))
        } else {
            let haystack = haystack.to_lowercase();
            self.keywords.iter().any(|k| haystack.contains(k.as_str()))
        }
    }
}
