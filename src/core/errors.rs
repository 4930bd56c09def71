// Domain error types - Secure error handling with no information disclosure

use thiserror::Error;

/// Main error type for the firewall
#[derive(Error, Debug)]
pub enum FirewallError {
    /// Entity recognition service failure (HTTP 502)
    ///
    /// Not recovered: partial PII detection is worse than a clear failure.
    #[error("Entity recognition failed: {0}")]
    RecognizerError(String),

    /// A detector task failed to complete (HTTP 500)
    #[error("Detector failure: {0}")]
    DetectorFailure(String),

    /// History store failure during risk scoring (HTTP 500)
    #[error("History store error: {0}")]
    HistoryError(String),

    /// Policy store failure (HTTP 500)
    #[error("Policy store error: {0}")]
    PolicyStoreError(String),

    /// Configuration error (HTTP 500)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Rejected request input (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FirewallError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            FirewallError::RecognizerError(_) => 502,
            FirewallError::DetectorFailure(_) => 500,
            FirewallError::HistoryError(_) => 500,
            FirewallError::PolicyStoreError(_) => 500,
            FirewallError::ConfigurationError(_) => 500,
            FirewallError::InvalidRequest(_) => 400,
        }
    }

    /// Get user-friendly error message (no sensitive information)
    pub fn user_message(&self) -> String {
        match self {
            FirewallError::RecognizerError(_) => "Analysis service unavailable".to_string(),
            FirewallError::DetectorFailure(_) => "Firewall analysis failed".to_string(),
            FirewallError::HistoryError(_) => "Internal error".to_string(),
            FirewallError::PolicyStoreError(_) => "Internal error".to_string(),
            FirewallError::ConfigurationError(_) => "Internal error".to_string(),
            FirewallError::InvalidRequest(reason) => format!("Invalid request: {}", reason),
        }
    }
}
