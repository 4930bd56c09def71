// Entity recognition capability boundary

use crate::core::errors::FirewallError;
use async_trait::async_trait;

pub mod regex_recognizer;

pub use regex_recognizer::RegexEntityRecognizer;

/// One detected entity span, half-open byte range into the analyzed text.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    /// Entity label, e.g. `EMAIL_ADDRESS`, `US_SSN`.
    pub label: String,
    /// Recognizer confidence in [0, 1].
    pub score: f64,
}

/// External entity-recognition capability.
///
/// The firewall consumes only this span contract; the recognition model
/// behind it is a collaborator. The built-in [`RegexEntityRecognizer`] keeps
/// the pipeline exercisable in-process, and any external span-detection
/// service can be substituted behind the same trait.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Vec<EntitySpan>, FirewallError>;
}
