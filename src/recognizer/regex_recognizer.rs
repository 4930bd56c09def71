// Built-in pattern-based entity recognizer

use crate::core::errors::FirewallError;
use crate::recognizer::{EntityRecognizer, EntitySpan};
use async_trait::async_trait;
use regex::Regex;

/// One recognizer rule: label, pattern, base confidence.
struct EntityRule {
    label: &'static str,
    pattern: Regex,
    score: f64,
}

/// In-process recognizer covering the allowlisted identifier shapes with
/// compiled patterns and per-label confidence scores. Structured
/// identifiers with a checksum (payment cards) are validated before a span
/// is emitted, so a random digit run does not score as a card.
pub struct RegexEntityRecognizer {
    rules: Vec<EntityRule>,
}

impl RegexEntityRecognizer {
    pub fn new() -> Result<Self, FirewallError> {
        let table: [(&'static str, &'static str, f64); 6] = [
            (
                "EMAIL_ADDRESS",
                r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
                1.0,
            ),
            (
                "PHONE_NUMBER",
                r"\b\+?\d{1,3}[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
                0.75,
            ),
            ("US_SSN", r"\b\d{3}-\d{2}-\d{4}\b", 0.85),
            ("CREDIT_CARD", r"\b(?:\d[ -]?){13,16}\b", 1.0),
            ("IP_ADDRESS", r"\b(?:\d{1,3}\.){3}\d{1,3}\b", 0.95),
            ("IBAN_CODE", r"\b[A-Z]{2}\d{2}[A-Z0-9]{11,30}\b", 0.8),
        ];

        let mut rules = Vec::with_capacity(table.len());
        for (label, pattern, score) in table {
            let compiled = Regex::new(pattern).map_err(|e| {
                FirewallError::ConfigurationError(format!(
                    "Recognizer pattern for {} failed to compile: {}",
                    label, e
                ))
            })?;
            rules.push(EntityRule {
                label,
                pattern: compiled,
                score,
            });
        }

        Ok(Self { rules })
    }
}

#[async_trait]
impl EntityRecognizer for RegexEntityRecognizer {
    async fn analyze(&self, text: &str) -> Result<Vec<EntitySpan>, FirewallError> {
        let mut spans = Vec::new();

        for rule in &self.rules {
            for m in rule.pattern.find_iter(text) {
                match rule.label {
                    "CREDIT_CARD" if !luhn_valid(m.as_str()) => continue,
                    "IP_ADDRESS" if !octets_valid(m.as_str()) => continue,
                    _ => {}
                }
                spans.push(EntitySpan {
                    start: m.start(),
                    end: m.end(),
                    label: rule.label.to_string(),
                    score: rule.score,
                });
            }
        }

        Ok(spans)
    }
}

/// Luhn checksum over the digits of a candidate card number.
fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }

    let mut sum = 0;
    for (i, digit) in digits.iter().rev().enumerate() {
        let mut d = *digit;
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

fn octets_valid(candidate: &str) -> bool {
    candidate
        .split('.')
        .all(|octet| octet.parse::<u8>().is_ok())
}
