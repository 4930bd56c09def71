// Injection pattern library - compiled once at startup, shared read-only

use crate::core::errors::FirewallError;
use crate::core::models::Severity;
use regex::Regex;

/// Injection pattern category. Order of the variants is the scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionCategory {
    Roleplay,
    LogicTrap,
    Encoding,
    Exfiltration,
}

impl InjectionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InjectionCategory::Roleplay => "roleplay",
            InjectionCategory::LogicTrap => "logic_trap",
            InjectionCategory::Encoding => "encoding",
            InjectionCategory::Exfiltration => "exfiltration",
        }
    }

    /// Category severity table; anything not listed here (the structural
    /// heuristics carry their own levels) falls back to medium.
    pub fn severity(&self) -> Severity {
        match self {
            InjectionCategory::Roleplay => Severity::High,
            InjectionCategory::LogicTrap => Severity::High,
            InjectionCategory::Exfiltration => Severity::Critical,
            InjectionCategory::Encoding => Severity::Medium,
        }
    }
}

/// All categories in scan order.
const CATEGORY_ORDER: [InjectionCategory; 4] = [
    InjectionCategory::Roleplay,
    InjectionCategory::LogicTrap,
    InjectionCategory::Encoding,
    InjectionCategory::Exfiltration,
];

// The regex crate has no lookaround, so the roleplay rule that excluded
// "you are now an assistant" is written as an alternation over hostile role
// nouns instead.
const ROLEPLAY_PATTERNS: &[&str] = &[
    r"(?i)ignore\s+(?:all\s+)?(?:the\s+)?(?:previous|prior|above)\s+instructions",
    r"(?i)act\s+as\s+(?:a\s+)?(?:dan|evil|unrestricted)",
    r"(?i)you\s+are\s+now\s+(?:an?\s+)?(?:dan|evil|unrestricted|unfiltered|jailbroken|hacker)",
    r"(?i)forget\s+(?:all\s+)?(?:the\s+)?(?:previous|your)\s+(?:instructions|rules)",
    r"(?i)disregard\s+(?:all\s+)?(?:the\s+)?(?:previous|prior)",
    r"(?i)new\s+instructions?\s*:",
    r"(?i)system\s+prompt\s*:",
    r"(?i)developer\s+mode",
];

const LOGIC_TRAP_PATTERNS: &[&str] = &[
    r"(?i)if\s+you\s+(?:don't|do\s+not)\s+\w+\s*,\s*then",
    r"(?i)you\s+must\s+(?:respond|answer|tell)",
    r"(?i)it's\s+(?:okay|fine|safe)\s+to\s+(?:tell|share|reveal)",
    r"(?i)this\s+is\s+(?:a\s+)?(?:test|simulation|hypothetical)",
];

const ENCODING_PATTERNS: &[&str] = &[
    r"(?i)base64:",
    r"(?i)decode\s+(?:this|the\s+following)",
    r"[A-Za-z0-9+/]{20,}={0,2}",
    r"&#x200[B-F];",
    r"\\u200[B-F]",
];

const EXFILTRATION_PATTERNS: &[&str] = &[
    r"(?i)(?:send|post|transmit)\s+(?:to|at)\s+https?://",
    r"(?i)webhook\s+(?:url|endpoint)",
    r"(?i)api\s+key\s+is",
    r"(?i)secret\s*=",
    r"(?i)password\s*[:=]",
];

/// Maximal base64-alphabet run worth attempting to decode.
const BASE64_RUN_PATTERN: &str = r"[A-Za-z0-9+/]{20,}={0,2}";

/// Immutable, process-wide compiled pattern sets.
///
/// Built once at startup and passed by `Arc` into detector instances; never
/// mutated afterwards, so it is shared across concurrent evaluations without
/// locking.
pub struct InjectionPatterns {
    categories: Vec<(InjectionCategory, Vec<Regex>)>,
    base64_run: Regex,
}

impl InjectionPatterns {
    /// Compile every built-in pattern. Fails only on a programming error in
    /// the pattern tables, surfaced as a configuration error at startup.
    pub fn compile() -> Result<Self, FirewallError> {
        let mut categories = Vec::with_capacity(CATEGORY_ORDER.len());
        for category in CATEGORY_ORDER {
            let sources = match category {
                InjectionCategory::Roleplay => ROLEPLAY_PATTERNS,
                InjectionCategory::LogicTrap => LOGIC_TRAP_PATTERNS,
                InjectionCategory::Encoding => ENCODING_PATTERNS,
                InjectionCategory::Exfiltration => EXFILTRATION_PATTERNS,
            };
            let compiled = sources
                .iter()
                .map(|p| Self::compile_one(p))
                .collect::<Result<Vec<_>, _>>()?;
            categories.push((category, compiled));
        }

        Ok(Self {
            categories,
            base64_run: Self::compile_one(BASE64_RUN_PATTERN)?,
        })
    }

    fn compile_one(pattern: &str) -> Result<Regex, FirewallError> {
        Regex::new(pattern).map_err(|e| {
            FirewallError::ConfigurationError(format!(
                "Built-in pattern '{}' failed to compile: {}",
                pattern, e
            ))
        })
    }

    /// Categories with their compiled patterns, in scan order.
    pub fn categories(&self) -> impl Iterator<Item = (InjectionCategory, &[Regex])> {
        self.categories.iter().map(|(c, p)| (*c, p.as_slice()))
    }

    /// Matcher for maximal base64-alphabet runs (length >= 20, optional
    /// padding), used by input normalization.
    pub fn base64_run(&self) -> &Regex {
        &self.base64_run
    }
}
