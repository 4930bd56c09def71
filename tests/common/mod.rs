// Shared test fixtures and helpers
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use prompt_firewall::core::errors::FirewallError;
use prompt_firewall::core::models::{
    Decision, DecisionSnapshot, Finding, FindingKind, HistoryRecord, Policy, PolicyAction,
    PolicyType, Severity,
};
use prompt_firewall::recognizer::{EntityRecognizer, EntitySpan};

/// Recognizer that returns a fixed span list regardless of input.
pub struct StaticRecognizer {
    pub spans: Vec<EntitySpan>,
}

#[async_trait]
impl EntityRecognizer for StaticRecognizer {
    async fn analyze(&self, _text: &str) -> Result<Vec<EntitySpan>, FirewallError> {
        Ok(self.spans.clone())
    }
}

/// Recognizer that always fails, for failure-propagation tests.
pub struct FailingRecognizer;

#[async_trait]
impl EntityRecognizer for FailingRecognizer {
    async fn analyze(&self, _text: &str) -> Result<Vec<EntitySpan>, FirewallError> {
        Err(FirewallError::RecognizerError(
            "recognizer unavailable".to_string(),
        ))
    }
}

pub fn make_policy(
    id: &str,
    kind: PolicyType,
    pattern: &str,
    action: PolicyAction,
) -> Policy {
    Policy {
        id: id.to_string(),
        name: format!("{} policy", id),
        kind,
        pattern: pattern.to_string(),
        action,
        severity: Severity::Medium,
        enabled: true,
    }
}

pub fn make_finding(kind: FindingKind, subtype: &str, severity: Severity) -> Finding {
    Finding {
        kind,
        subtype: subtype.to_string(),
        match_preview: format!("{} match", subtype),
        raw_match: None,
        severity,
        position: 0,
        confidence: None,
        policy_id: None,
        policy_name: None,
        pattern: None,
    }
}

pub fn make_decision(severity: Severity) -> Decision {
    Decision {
        decision: PolicyAction::Warn,
        prompt_modified: String::new(),
        response_modified: String::new(),
        findings: Vec::new(),
        explanations: Vec::new(),
        severity,
        metadata: serde_json::Map::new(),
    }
}

pub fn make_record(
    timestamp: DateTime<Utc>,
    action: PolicyAction,
    with_risks: bool,
) -> HistoryRecord {
    let risks = if with_risks {
        vec![make_finding(
            FindingKind::PromptInjection,
            "roleplay",
            Severity::High,
        )]
    } else {
        Vec::new()
    };

    HistoryRecord {
        timestamp,
        decision: DecisionSnapshot {
            decision: action,
            severity: Severity::Medium,
        },
        risks,
        severity: Severity::Medium,
        user_id: "user-1".to_string(),
        tenant_id: "tenant-a".to_string(),
    }
}

pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}
