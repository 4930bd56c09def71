// Shared domain model - findings, policies, decisions, history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Findings previews are clipped to this many characters before they leave a
/// detector; only `raw_match` keeps the full substring, and it never
/// serializes outward.
pub const PREVIEW_MAX_CHARS: usize = 50;

/// Bounded composite anomaly score, 0..=100.
pub type RiskScore = u8;

/// Ordered risk level. The derived `Ord` is the severity order used
/// everywhere: low < medium < high < critical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which detector produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    #[serde(rename = "PII")]
    Pii,
    #[serde(rename = "PROMPT_INJECTION")]
    PromptInjection,
    #[serde(rename = "CUSTOM")]
    Custom,
}

/// A single detected risk instance produced by one detector.
///
/// `match_preview` is always clipped to [`PREVIEW_MAX_CHARS`]. `raw_match`,
/// when present, is the untruncated original substring; it exists only so
/// redaction can find the text again and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub subtype: String,
    #[serde(rename = "match")]
    pub match_preview: String,
    #[serde(skip)]
    pub raw_match: Option<String>,
    pub severity: Severity,
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Finding {
    /// Clip a matched substring to the preview budget, respecting char
    /// boundaries.
    pub fn clip_preview(text: &str) -> String {
        text.chars().take(PREVIEW_MAX_CHARS).collect()
    }
}

/// Tenant policy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    Pii,
    Injection,
    Custom,
}

/// Resolved action for one analysis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Allow,
    Redact,
    Warn,
    Block,
}

impl PolicyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyAction::Allow => "allow",
            PolicyAction::Redact => "redact",
            PolicyAction::Warn => "warn",
            PolicyAction::Block => "block",
        }
    }
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_policy_severity() -> Severity {
    Severity::Medium
}

/// Tenant-configured rule mapping a risk signature to a forced action.
///
/// Owned by a tenant and immutable during one evaluation call. For
/// `custom` policies `pattern` is a regular expression; for the other kinds
/// it names a finding subtype to match (case-insensitive).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PolicyType,
    #[serde(default)]
    pub pattern: String,
    pub action: PolicyAction,
    #[serde(default = "default_policy_severity")]
    pub severity: Severity,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// The final action plus modified text and aggregated findings for one
/// analysis call. Created once per call; the caller may append a risk score
/// into `metadata` afterwards, nothing else mutates it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub decision: PolicyAction,
    pub prompt_modified: String,
    pub response_modified: String,
    pub findings: Vec<Finding>,
    pub explanations: Vec<String>,
    pub severity: Severity,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Nested decision snapshot stored alongside a history record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSnapshot {
    pub decision: PolicyAction,
    pub severity: Severity,
}

/// Read-only snapshot of one past analysis, supplied by the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub decision: DecisionSnapshot,
    #[serde(default)]
    pub risks: Vec<Finding>,
    pub severity: Severity,
    pub user_id: String,
    pub tenant_id: String,
}
