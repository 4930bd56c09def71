// Policy resolution - merged findings + tenant policy list -> Decision

use crate::core::models::{
    Decision, Finding, FindingKind, Policy, PolicyAction, PolicyType, Severity,
};
use crate::engine::pii;
use serde_json::json;

/// Resolves merged findings and the tenant policy list into a single
/// decision. Stateless; evaluation order is fixed by the caller-supplied
/// policy order (first match wins) with the severity table as fallback.
pub struct PolicyEngine;

impl PolicyEngine {
    /// Evaluate one analysis call.
    ///
    /// Finding concatenation order is fixed: PII, then injection, then
    /// custom. Only PII findings are ever redacted out of the text;
    /// injection and custom findings influence the decision only.
    pub fn evaluate(
        prompt: &str,
        response: &str,
        pii_findings: Vec<Finding>,
        injection_findings: Vec<Finding>,
        custom_findings: Vec<Finding>,
        policies: &[Policy],
    ) -> Decision {
        let total = pii_findings.len() + injection_findings.len() + custom_findings.len();
        if total == 0 {
            let mut metadata = serde_json::Map::new();
            metadata.insert("total_checks".to_string(), json!(2));
            return Decision {
                decision: PolicyAction::Allow,
                prompt_modified: prompt.to_string(),
                response_modified: response.to_string(),
                findings: Vec::new(),
                explanations: vec!["No security risks detected".to_string()],
                severity: Severity::Low,
                metadata,
            };
        }

        let all: Vec<&Finding> = pii_findings
            .iter()
            .chain(injection_findings.iter())
            .chain(custom_findings.iter())
            .collect();

        let max_severity = all
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Low);

        let action = Self::determine_action(&all, policies, max_severity);

        let (prompt_modified, response_modified, tag) = match action {
            PolicyAction::Block => (
                "[BLOCKED]".to_string(),
                Self::block_message(&all),
                "blocked",
            ),
            PolicyAction::Redact => (
                pii::redact(prompt, &pii_findings),
                pii::redact(response, &pii_findings),
                "redacted",
            ),
            PolicyAction::Warn => (prompt.to_string(), response.to_string(), "warned"),
            PolicyAction::Allow => (prompt.to_string(), response.to_string(), "allowed"),
        };

        let explanations = all.iter().map(|f| Self::explain(f, tag)).collect();

        let mut metadata = serde_json::Map::new();
        metadata.insert("pii_count".to_string(), json!(pii_findings.len()));
        metadata.insert("injection_count".to_string(), json!(injection_findings.len()));
        metadata.insert("custom_count".to_string(), json!(custom_findings.len()));
        metadata.insert("total_risks".to_string(), json!(total));

        let mut findings = pii_findings;
        findings.extend(injection_findings);
        findings.extend(custom_findings);

        Decision {
            decision: action,
            prompt_modified,
            response_modified,
            findings,
            explanations,
            severity: max_severity,
            metadata,
        }
    }

    /// First enabled policy with at least one matching finding wins and its
    /// action overrides the default table. Custom policies match findings by
    /// policy id; pii/injection policies match a finding subtype against the
    /// policy pattern, case-insensitive. No match falls back to the severity
    /// table.
    fn determine_action(
        findings: &[&Finding],
        policies: &[Policy],
        max_severity: Severity,
    ) -> PolicyAction {
        for policy in policies {
            if !policy.enabled {
                continue;
            }

            let matched = match policy.kind {
                PolicyType::Custom => findings
                    .iter()
                    .any(|f| f.policy_id.as_deref() == Some(policy.id.as_str())),
                _ => findings
                    .iter()
                    .any(|f| f.subtype.eq_ignore_ascii_case(&policy.pattern)),
            };

            if matched {
                return policy.action;
            }
        }

        match max_severity {
            Severity::Critical | Severity::High => PolicyAction::Block,
            Severity::Medium => PolicyAction::Redact,
            Severity::Low => PolicyAction::Warn,
        }
    }

    /// Violation notice enumerating the distinct subtypes present, in
    /// first-seen order.
    fn block_message(findings: &[&Finding]) -> String {
        let mut subtypes: Vec<&str> = Vec::new();
        for finding in findings {
            if !subtypes.contains(&finding.subtype.as_str()) {
                subtypes.push(&finding.subtype);
            }
        }
        format!(
            "This request was blocked due to security policy violations. \
             Detected issues: {}. \
             Please review your input and try again without sensitive information or injection attempts.",
            subtypes.join(", ")
        )
    }

    fn explain(finding: &Finding, tag: &str) -> String {
        match finding.kind {
            FindingKind::Pii => format!(
                "PII detected: {} (severity: {}) - {}",
                finding.subtype, finding.severity, tag
            ),
            FindingKind::PromptInjection => format!(
                "Injection attempt detected: {} (severity: {}) - {}",
                finding.subtype, finding.severity, tag
            ),
            FindingKind::Custom => format!(
                "Custom pattern detected: {} (severity: {}) - {}",
                finding
                    .policy_name
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("custom"),
                finding.severity,
                tag
            ),
        }
    }
}
