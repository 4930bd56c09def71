// Prompt injection detection - pattern scan over normalized text plus
// structural heuristics

use crate::core::models::{Finding, FindingKind, Severity};
use crate::engine::patterns::InjectionPatterns;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use std::sync::Arc;
use tracing::debug;

/// Zero-width / format characters stripped during normalization.
const ZERO_WIDTH_CHARS: [char; 4] = ['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'];

/// Literal delimiter sequences counted by the delimiter-repetition heuristic.
const DELIMITER_SEQUENCES: [&str; 5] = ["---", "===", "***", "###", "```"];

/// More than this many delimiter sequences in one prompt looks like an
/// attempt to forge message boundaries.
const DELIMITER_THRESHOLD: usize = 5;

/// Prompts longer than this are flagged as anomalous (potential overflow /
/// smuggling payload). Short prompts are normal and never flagged.
const LENGTH_ANOMALY_CHARS: usize = 5000;

/// Scans normalized text for the shared pattern library categories plus two
/// structural heuristics. Pure over its input; a non-matching pattern yields
/// no findings and there are no error conditions.
pub struct InjectionDetector {
    patterns: Arc<InjectionPatterns>,
}

impl InjectionDetector {
    pub fn new(patterns: Arc<InjectionPatterns>) -> Self {
        Self { patterns }
    }

    /// Detect injection attempts in `text`.
    ///
    /// Findings come back in a fixed order: category scan (library order,
    /// then match order), then the structural heuristics. Downstream
    /// explanation generation depends on that order; scoring does not.
    pub fn detect(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        let normalized = self.normalize_input(text);

        for (category, patterns) in self.patterns.categories() {
            for pattern in patterns {
                for m in pattern.find_iter(&normalized) {
                    findings.push(Finding {
                        kind: FindingKind::PromptInjection,
                        subtype: category.as_str().to_string(),
                        match_preview: Finding::clip_preview(m.as_str()),
                        raw_match: None,
                        severity: category.severity(),
                        position: m.start(),
                        confidence: None,
                        policy_id: None,
                        policy_name: None,
                        pattern: Some(Finding::clip_preview(pattern.as_str())),
                    });
                }
            }
        }

        // Structural heuristics run over the original text, independent of
        // the category scan.
        if self.count_delimiters(text) > DELIMITER_THRESHOLD {
            findings.push(Finding {
                kind: FindingKind::PromptInjection,
                subtype: "delimiter_attack".to_string(),
                match_preview: "Multiple delimiter sequences detected".to_string(),
                raw_match: None,
                severity: Severity::High,
                position: 0,
                confidence: None,
                policy_id: None,
                policy_name: None,
                pattern: None,
            });
        }

        let char_count = text.chars().count();
        if char_count > LENGTH_ANOMALY_CHARS {
            findings.push(Finding {
                kind: FindingKind::PromptInjection,
                subtype: "anomalous_length".to_string(),
                match_preview: format!("Unusual prompt length: {} chars", char_count),
                raw_match: None,
                severity: Severity::Medium,
                position: 0,
                confidence: None,
                policy_id: None,
                policy_name: None,
                pattern: None,
            });
        }

        findings
    }

    /// Strip zero-width characters, then best-effort decode base64 payloads
    /// and append the plaintext so the pattern scan sees through the
    /// encoding. Decode failures are silently ignored, never raised.
    fn normalize_input(&self, text: &str) -> String {
        let mut normalized: String = text
            .chars()
            .filter(|c| !ZERO_WIDTH_CHARS.contains(c))
            .collect();

        let lowered = text.to_lowercase();
        let hints_base64 =
            lowered.contains("base64") || lowered.contains("===") || lowered.contains("==");
        if hints_base64 {
            let runs: Vec<String> = self
                .patterns
                .base64_run()
                .find_iter(&normalized)
                .map(|m| m.as_str().to_string())
                .collect();

            for run in runs {
                if let Ok(bytes) = BASE64_STANDARD.decode(run.as_bytes()) {
                    if let Ok(decoded) = String::from_utf8(bytes) {
                        debug!(decoded_len = decoded.len(), "Appending decoded base64 payload");
                        normalized.push(' ');
                        normalized.push_str(&decoded);
                    }
                }
            }
        }

        normalized
    }

    fn count_delimiters(&self, text: &str) -> usize {
        DELIMITER_SEQUENCES
            .iter()
            .map(|d| text.matches(d).count())
            .sum()
    }
}
