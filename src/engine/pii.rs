// PII detection adapter - filters and masks entity-recognition spans into
// findings, and owns the redaction rule

use crate::core::errors::FirewallError;
use crate::core::models::{Finding, FindingKind, Severity};
use crate::recognizer::EntityRecognizer;
use std::sync::Arc;
use tracing::debug;

/// Minimum span confidence surfaced as a finding.
pub const MIN_ENTITY_CONFIDENCE: f64 = 0.75;

/// Entity labels the adapter will surface; anything else the recognizer
/// returns is dropped.
const ALLOWED_ENTITIES: [&str; 10] = [
    "EMAIL_ADDRESS",
    "PHONE_NUMBER",
    "US_SSN",
    "CREDIT_CARD",
    "IP_ADDRESS",
    "MEDICAL_LICENSE",
    "US_PASSPORT",
    "US_DRIVER_LICENSE",
    "US_BANK_NUMBER",
    "IBAN_CODE",
];

/// Adapter over an external entity-recognition capability.
///
/// Delegates span detection to the recognizer and turns the surviving spans
/// into masked findings. The recognizer's internal model is never
/// reimplemented here; only its span contract is consumed.
pub struct PiiDetector {
    recognizer: Arc<dyn EntityRecognizer>,
    min_confidence: f64,
}

impl PiiDetector {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, min_confidence: f64) -> Self {
        Self {
            recognizer,
            min_confidence,
        }
    }

    /// Detect sensitive entities in `text`.
    ///
    /// A recognizer failure is fatal for the call: partial PII detection is
    /// worse than a clear failure.
    pub async fn detect(&self, text: &str) -> Result<Vec<Finding>, FirewallError> {
        let spans = self.recognizer.analyze(text).await?;

        let mut findings = Vec::new();
        for span in spans {
            if span.score < self.min_confidence {
                continue;
            }
            if !ALLOWED_ENTITIES.contains(&span.label.as_str()) {
                debug!(label = %span.label, "Dropping span outside entity allowlist");
                continue;
            }
            let Some(raw) = text.get(span.start..span.end) else {
                continue;
            };

            let subtype = span.label.to_lowercase();
            findings.push(Finding {
                kind: FindingKind::Pii,
                subtype: subtype.clone(),
                match_preview: mask(raw),
                raw_match: Some(raw.to_string()),
                severity: entity_severity(&subtype),
                position: span.start,
                confidence: Some(span.score),
                policy_id: None,
                policy_name: None,
                pattern: None,
            });
        }

        Ok(findings)
    }
}

/// Replace detected PII in `text` with `[REDACTED_<SUBTYPE>]` placeholders.
///
/// Findings are processed by descending position so earlier replacements do
/// not shift later offsets. Each `raw_match` is replaced at most once, and
/// only findings of severity medium or above are redacted. Findings without
/// a `raw_match` are skipped; the masked preview is not reversible. A raw
/// match no longer present in the text is a no-op.
pub fn redact(text: &str, findings: &[Finding]) -> String {
    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by(|a, b| b.position.cmp(&a.position));

    let mut redacted = text.to_string();
    for finding in ordered {
        if finding.severity < Severity::Medium {
            continue;
        }
        let Some(raw) = finding.raw_match.as_deref() else {
            continue;
        };
        let placeholder = format!("[REDACTED_{}]", finding.subtype.to_uppercase());
        redacted = redacted.replacen(raw, &placeholder, 1);
    }

    redacted
}

/// Mask a matched value for the preview: short values vanish entirely,
/// longer ones keep two chars of context at each end.
fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Fixed per-entity severity table; any allowed entity not listed is medium.
fn entity_severity(subtype: &str) -> Severity {
    match subtype {
        "us_ssn" | "credit_card" | "us_passport" | "us_driver_license" | "us_bank_number"
        | "iban_code" | "medical_license" => Severity::Critical,
        "email_address" | "phone_number" | "ip_address" => Severity::Medium,
        _ => Severity::Medium,
    }
}
