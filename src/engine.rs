//! Rule Engine
//!
//! Evaluates the ordered classification rules against a validated record.
//! The first rule whose condition holds decides the verdict; when a rule
//! fires, the pattern table picks the most specific attack type.

use tracing::debug;

use crate::patterns::{AttackType, PatternTable};
use crate::validation::{Action, ThreatLabel, ValidatedRecord};
use crate::verdict::ClassificationResult;

/// Reason given when no rule fires
pub const ROUTINE_REASON: &str =
    "No indicators of threat in log fields—event is routine or allowed.";

/// Classification rule, declared in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Source labelled the event suspicious
    SuspiciousLabel,
    /// Blocked or failed event carrying a suspicious indicator
    FlaggedActionIndicators,
    /// Allowed event whose path is high-risk anyway
    AllowedHighRisk,
    /// Known offensive tool touching a sensitive path
    SuspiciousAgentSensitivePath,
    /// Known offensive tool that got blocked
    BlockedSuspiciousAgent,
}

impl Rule {
    /// All rules in strict priority order
    pub const ORDERED: [Rule; 5] = [
        Rule::SuspiciousLabel,
        Rule::FlaggedActionIndicators,
        Rule::AllowedHighRisk,
        Rule::SuspiciousAgentSensitivePath,
        Rule::BlockedSuspiciousAgent,
    ];

    /// 1-based priority; lower wins
    pub fn priority(&self) -> u8 {
        match self {
            Rule::SuspiciousLabel => 1,
            Rule::FlaggedActionIndicators => 2,
            Rule::AllowedHighRisk => 3,
            Rule::SuspiciousAgentSensitivePath => 4,
            Rule::BlockedSuspiciousAgent => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rule::SuspiciousLabel => "suspicious-label",
            Rule::FlaggedActionIndicators => "flagged-action-indicators",
            Rule::AllowedHighRisk => "allowed-high-risk",
            Rule::SuspiciousAgentSensitivePath => "suspicious-agent-sensitive-path",
            Rule::BlockedSuspiciousAgent => "blocked-suspicious-agent",
        }
    }

    fn applies(&self, record: &ValidatedRecord, table: &PatternTable) -> bool {
        let path = record.request_path();
        let agent = record.user_agent();

        match self {
            Rule::SuspiciousLabel => record.threat_label == ThreatLabel::Suspicious,
            Rule::FlaggedActionIndicators => {
                matches!(record.action, Action::Blocked | Action::Failed)
                    && table.has_suspicious_indicator(path)
            }
            Rule::AllowedHighRisk => {
                record.action == Action::Allowed && table.is_high_risk(path)
            }
            Rule::SuspiciousAgentSensitivePath => {
                table.is_suspicious_agent(agent) && table.is_sensitive_path(path)
            }
            Rule::BlockedSuspiciousAgent => {
                record.action == Action::Blocked && table.is_suspicious_agent(agent)
            }
        }
    }

    fn reason(&self, record: &ValidatedRecord, attack_type: AttackType) -> String {
        let indicators = attack_type.label().to_lowercase();
        match self {
            Rule::SuspiciousLabel => {
                format!("Event labeled as 'suspicious' with indicators: {}", indicators)
            }
            Rule::FlaggedActionIndicators => format!(
                "Event was {} and contains suspicious indicators: {}",
                record.action, indicators
            ),
            Rule::AllowedHighRisk => {
                format!("Allowed event contains high-risk patterns: {}", indicators)
            }
            Rule::SuspiciousAgentSensitivePath => format!(
                "Suspicious user agent '{}' accessing sensitive path: {}",
                record.user_agent(),
                indicators
            ),
            Rule::BlockedSuspiciousAgent => format!(
                "Event was {} with suspicious user agent '{}': {}",
                record.action,
                record.user_agent(),
                indicators
            ),
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stateless rule evaluator over an immutable pattern table
#[derive(Debug, Clone)]
pub struct RuleEngine {
    table: PatternTable,
}

impl RuleEngine {
    pub fn new(table: PatternTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// First rule whose condition holds, if any
    pub fn matching_rule(&self, record: &ValidatedRecord) -> Option<Rule> {
        Rule::ORDERED
            .into_iter()
            .find(|rule| rule.applies(record, &self.table))
    }

    /// Classify a validated record
    pub fn classify(&self, record: &ValidatedRecord) -> ClassificationResult {
        match self.matching_rule(record) {
            Some(rule) => {
                let attack_type =
                    self.determine_attack_type(record.request_path(), record.user_agent());
                debug!(
                    rule = rule.name(),
                    priority = rule.priority(),
                    attack_type = %attack_type,
                    "Classification rule fired"
                );
                ClassificationResult::malicious(attack_type, rule.reason(record, attack_type))
            }
            None => {
                debug!("No classification rule fired");
                ClassificationResult::non_malicious(ROUTINE_REASON)
            }
        }
    }

    /// Most specific attack type for a record already judged malicious.
    ///
    /// Pattern groups are tried in table order against the path; then exact
    /// tool signatures in the user agent. Never returns a non-attack.
    pub fn determine_attack_type(&self, request_path: &str, user_agent: &str) -> AttackType {
        if let Some(group) = self
            .table
            .groups()
            .iter()
            .find(|group| group.is_match(request_path))
        {
            debug!(
                group = group.name(),
                patterns = ?group.matching_patterns(request_path),
                "Pattern group matched"
            );
            return group.attack_type;
        }

        if self.table.is_sql_tool(user_agent) {
            return AttackType::SqlInjection;
        }

        if self.table.is_scanner(user_agent) {
            return AttackType::NetworkReconnaissance;
        }

        AttackType::SuspiciousActivity
    }
}
