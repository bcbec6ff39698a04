//! Pattern Table
//!
//! Immutable indicator data shared by every classification: the ordered
//! attack-type pattern groups, the keyword sets behind each rule condition,
//! and the known offensive-tool user agents. Built once, then only read.

pub mod group;

pub use group::{AttackType, KeywordSet, PatternGroup, PatternGroupBuilder};

use anyhow::{Context, Result};
use std::collections::BTreeSet;

use crate::config::PatternExtensions;
use crate::error::ConfigError;

/// Backup file names and backup paths
const BACKUP_ACCESS_PATTERNS: &[&str] = &[
    r"backup\.sql",
    r"/backup",
    r"download\?backup",
    r"\?backup\.sql",
    r"backup\.zip",
    r"backup\.db",
];

/// Traversal into system files, slash or backslash style. Case-sensitive.
const PATH_TRAVERSAL_PATTERNS: &[&str] = &[
    r"\.\.\\\.\.\\etc\\passwd",
    r"/etc/passwd",
    r"\?\.\.\\\.\.\\etc\\passwd",
    r"\.\./\.\./etc/passwd",
];

const ADMIN_PRIVILEGE_PATTERNS: &[&str] = &[
    r"/admin",
    r"\?admin",
    r"/admin/config",
    r"/dashboard\?admin",
    r"/wp-admin",
];

const LOGIN_PATTERNS: &[&str] = &[
    r"/login",
    r"/api/login",
    r"/wp-login\.php",
    r"\?login",
    r"/auth",
];

/// Upload endpoints, db-admin tools, executable and script extensions
const MALWARE_UPLOAD_PATTERNS: &[&str] = &[
    r"/upload\?phpmyadmin",
    r"/upload",
    r"phpmyadmin",
    r"\.php",
    r"\.exe",
    r"\.bat",
];

const SUSPICIOUS_AGENTS: &[&str] = &[
    "Nmap Scripting Engine",
    "SQLMap/1.6-dev",
    "curl/7.64.1",
    "nikto",
    "nessus",
    "masscan",
    "zmap",
];

const SQL_TOOL_AGENTS: &[&str] = &["SQLMap/1.6-dev"];

const SCANNER_AGENTS: &[&str] = &["Nmap Scripting Engine"];

const BACKUP_KEYWORDS: &[&str] = &["backup.sql", "/backup", "backup"];
const TRAVERSAL_KEYWORDS: &[&str] = &["../etc/passwd", "..\\..\\etc\\passwd", "/etc/passwd"];
const ADMIN_KEYWORDS: &[&str] = &["/admin", "?admin", "/wp-admin"];
const UPLOAD_KEYWORDS: &[&str] = &["phpmyadmin", "/upload", ".php", ".exe"];

const HIGH_RISK_BACKUP_KEYWORDS: &[&str] = &["backup"];
const HIGH_RISK_TRAVERSAL_KEYWORDS: &[&str] = &["../etc/passwd", "..\\..\\etc\\passwd"];
const HIGH_RISK_ADMIN_KEYWORDS: &[&str] = &["/admin"];

const SENSITIVE_PATH_KEYWORDS: &[&str] = &[
    "/admin",
    "/backup",
    "/etc/passwd",
    "backup.sql",
    "phpmyadmin",
    "/upload",
    "/download",
    "/config",
];

/// Read-only lookup table of indicators
#[derive(Debug, Clone)]
pub struct PatternTable {
    groups: Vec<PatternGroup>,
    suspicious_agents: BTreeSet<String>,
    sql_tool_agents: Vec<String>,
    scanner_agents: Vec<String>,
    suspicious_indicators: Vec<KeywordSet>,
    high_risk_indicators: Vec<KeywordSet>,
    sensitive_paths: KeywordSet,
}

impl PatternTable {
    /// Build the built-in table
    pub fn builtin() -> Result<Self> {
        let groups = vec![
            PatternGroupBuilder::new(AttackType::BackupAccess)
                .patterns(BACKUP_ACCESS_PATTERNS)
                .build()
                .context("backup_access patterns")?,
            PatternGroupBuilder::new(AttackType::PathTraversal)
                .case_sensitive(true)
                .patterns(PATH_TRAVERSAL_PATTERNS)
                .build()
                .context("path_traversal patterns")?,
            PatternGroupBuilder::new(AttackType::PrivilegeEscalation)
                .patterns(ADMIN_PRIVILEGE_PATTERNS)
                .build()
                .context("admin_privilege patterns")?,
            PatternGroupBuilder::new(AttackType::SuspiciousLogin)
                .patterns(LOGIN_PATTERNS)
                .build()
                .context("login_brute_force patterns")?,
            PatternGroupBuilder::new(AttackType::MalwareUpload)
                .patterns(MALWARE_UPLOAD_PATTERNS)
                .build()
                .context("malware_upload patterns")?,
        ];

        Ok(Self {
            groups,
            suspicious_agents: to_strings(SUSPICIOUS_AGENTS).into_iter().collect(),
            sql_tool_agents: to_strings(SQL_TOOL_AGENTS),
            scanner_agents: to_strings(SCANNER_AGENTS),
            suspicious_indicators: vec![
                KeywordSet::new(BACKUP_KEYWORDS),
                KeywordSet::case_sensitive(TRAVERSAL_KEYWORDS),
                KeywordSet::new(ADMIN_KEYWORDS),
                KeywordSet::new(UPLOAD_KEYWORDS),
            ],
            high_risk_indicators: vec![
                KeywordSet::new(HIGH_RISK_BACKUP_KEYWORDS),
                KeywordSet::case_sensitive(HIGH_RISK_TRAVERSAL_KEYWORDS),
                KeywordSet::new(HIGH_RISK_ADMIN_KEYWORDS),
            ],
            sensitive_paths: KeywordSet::new(SENSITIVE_PATH_KEYWORDS),
        })
    }

    /// Built-in table extended with configured patterns and agents
    pub fn with_extensions(extensions: &PatternExtensions) -> Result<Self> {
        let mut table = Self::builtin()?;
        table.extend(extensions)?;
        Ok(table)
    }

    fn extend(&mut self, extensions: &PatternExtensions) -> Result<(), ConfigError> {
        for (name, extra) in &extensions.group_patterns {
            let group = self
                .groups
                .iter_mut()
                .find(|g| g.name() == name)
                .ok_or_else(|| ConfigError::UnknownGroup(name.clone()))?;

            *group = PatternGroupBuilder::from_group(group)
                .patterns(extra.as_slice())
                .build()
                .map_err(|source| ConfigError::Pattern {
                    group: name.clone(),
                    source,
                })?;
        }

        self.suspicious_agents
            .extend(extensions.suspicious_agents.iter().cloned());
        self.sql_tool_agents
            .extend(extensions.sql_tool_agents.iter().cloned());
        self.scanner_agents
            .extend(extensions.scanner_agents.iter().cloned());

        Ok(())
    }

    /// Pattern groups in priority order
    pub fn groups(&self) -> &[PatternGroup] {
        &self.groups
    }

    /// Look up a group by name (e.g. `"path_traversal"`)
    pub fn group(&self, name: &str) -> Option<&PatternGroup> {
        self.groups.iter().find(|g| g.name() == name)
    }

    /// Exact membership in the known offensive-tool agent set
    pub fn is_suspicious_agent(&self, user_agent: &str) -> bool {
        self.suspicious_agents.contains(user_agent)
    }

    pub fn suspicious_agents(&self) -> impl Iterator<Item = &str> {
        self.suspicious_agents.iter().map(String::as_str)
    }

    /// Exact match against a known SQL-injection tool signature
    pub fn is_sql_tool(&self, user_agent: &str) -> bool {
        self.sql_tool_agents.iter().any(|a| a == user_agent)
    }

    /// Exact match against a known network-scanner signature
    pub fn is_scanner(&self, user_agent: &str) -> bool {
        self.scanner_agents.iter().any(|a| a == user_agent)
    }

    /// Backup, traversal, admin or upload indicator anywhere in the path
    pub fn has_suspicious_indicator(&self, request_path: &str) -> bool {
        self.suspicious_indicators
            .iter()
            .any(|set| set.matches(request_path))
    }

    /// Backup, traversal or admin indicators that stay risky when allowed
    pub fn is_high_risk(&self, request_path: &str) -> bool {
        self.high_risk_indicators
            .iter()
            .any(|set| set.matches(request_path))
    }

    pub fn is_sensitive_path(&self, request_path: &str) -> bool {
        self.sensitive_paths.matches(request_path)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
