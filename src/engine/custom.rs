// Tenant-supplied pattern detection

use crate::core::models::{Finding, FindingKind, Policy};
use regex::Regex;
use tracing::debug;

/// Compiles and applies tenant-defined regular expressions.
///
/// Operates on the custom subset of a tenant's policies. A policy with an
/// invalid pattern is skipped on its own; it never aborts the batch and the
/// remaining policies still evaluate.
pub struct CustomDetector;

impl CustomDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, text: &str, custom_policies: &[Policy]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for policy in custom_policies {
            if !policy.enabled {
                continue;
            }
            if policy.pattern.is_empty() {
                continue;
            }

            let compiled = match Regex::new(&policy.pattern) {
                Ok(re) => re,
                Err(e) => {
                    debug!(
                        policy_id = %policy.id,
                        error = %e,
                        "Skipping custom policy with invalid pattern"
                    );
                    continue;
                }
            };

            for m in compiled.find_iter(text) {
                findings.push(Finding {
                    kind: FindingKind::Custom,
                    subtype: "custom".to_string(),
                    match_preview: Finding::clip_preview(m.as_str()),
                    raw_match: None,
                    severity: policy.severity,
                    position: m.start(),
                    confidence: None,
                    policy_id: Some(policy.id.clone()),
                    policy_name: Some(policy.name.clone()),
                    pattern: Some(Finding::clip_preview(&policy.pattern)),
                });
            }
        }

        findings
    }
}

impl Default for CustomDetector {
    fn default() -> Self {
        Self::new()
    }
}
