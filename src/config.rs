// Configuration management

use crate::core::errors::FirewallError;
use crate::engine::pii::MIN_ENTITY_CONFIDENCE;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
///
/// All configuration is validated on load with clear error messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub bind_address: String,
    pub port: u16,

    // Tenant policy file
    pub policies_yaml_path: PathBuf,

    // Detection tuning
    pub entity_confidence_threshold: f64,
    pub max_prompt_chars: usize,

    // Anomaly scoring
    pub history_window_days: i64,

    // Middleware configuration
    pub request_timeout_secs: u64,
    pub body_size_limit_bytes: usize,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    /// Validates all required fields and file paths.
    pub fn from_env() -> Result<Self, FirewallError> {
        // Load .env file if present (development)
        // Skip in test environment to avoid interfering with test environment variables
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok(); // Ignore errors (file may not exist)
        }

        let config = Self {
            bind_address: Self::get_env_or_default("BIND_ADDRESS", "0.0.0.0")?,
            port: Self::parse_port()?,
            policies_yaml_path: Self::get_required_path("POLICIES_YAML_PATH")?,
            entity_confidence_threshold: Self::parse_f64_or_default(
                "ENTITY_CONFIDENCE_THRESHOLD",
                MIN_ENTITY_CONFIDENCE,
            )?,
            max_prompt_chars: Self::parse_usize_or_default("MAX_PROMPT_CHARS", 10_000)?,
            history_window_days: Self::parse_i64_or_default("HISTORY_WINDOW_DAYS", 7)?,
            request_timeout_secs: Self::parse_u64_or_default("REQUEST_TIMEOUT_SECS", 30)?,
            body_size_limit_bytes: Self::parse_usize_or_default(
                "BODY_SIZE_LIMIT_BYTES",
                2 * 1024 * 1024,
            )?,
            log_level: Self::get_env_or_default("LOG_LEVEL", "info")?,
            log_format: Self::get_env_or_default("LOG_FORMAT", "json")?,
        };

        // Post-load validation
        config.validate()?;

        Ok(config)
    }

    /// Get environment variable or return default value
    fn get_env_or_default(key: &str, default: &str) -> Result<String, FirewallError> {
        Ok(env::var(key).unwrap_or_else(|_| default.to_string()))
    }

    /// Get required file path from environment variable
    fn get_required_path(key: &str) -> Result<PathBuf, FirewallError> {
        let value = env::var(key)
            .map_err(|_| FirewallError::ConfigurationError(format!("{} not set", key)))?;

        if value.is_empty() {
            return Err(FirewallError::ConfigurationError(format!(
                "{} is empty",
                key
            )));
        }

        Ok(PathBuf::from(value))
    }

    /// Parse port from PORT environment variable
    fn parse_port() -> Result<u16, FirewallError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
        let port = port_str.parse::<u16>().map_err(|e| {
            FirewallError::ConfigurationError(format!("Invalid PORT value '{}': {}", port_str, e))
        })?;

        if port == 0 {
            return Err(FirewallError::ConfigurationError(
                "PORT must be between 1 and 65535".to_string(),
            ));
        }

        Ok(port)
    }

    /// Parse u64 from environment variable or return default
    fn parse_u64_or_default(key: &str, default: u64) -> Result<u64, FirewallError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<u64>().map_err(|e| {
                    FirewallError::ConfigurationError(format!(
                        "Invalid {} value '{}': {}",
                        key, value, e
                    ))
                })?;

                if parsed == 0 {
                    return Err(FirewallError::ConfigurationError(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Parse i64 from environment variable or return default
    fn parse_i64_or_default(key: &str, default: i64) -> Result<i64, FirewallError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<i64>().map_err(|e| {
                    FirewallError::ConfigurationError(format!(
                        "Invalid {} value '{}': {}",
                        key, value, e
                    ))
                })?;

                if parsed <= 0 {
                    return Err(FirewallError::ConfigurationError(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Parse usize from environment variable or return default
    fn parse_usize_or_default(key: &str, default: usize) -> Result<usize, FirewallError> {
        match env::var(key) {
            Ok(value) => {
                let parsed = value.parse::<usize>().map_err(|e| {
                    FirewallError::ConfigurationError(format!(
                        "Invalid {} value '{}': {}",
                        key, value, e
                    ))
                })?;

                if parsed == 0 {
                    return Err(FirewallError::ConfigurationError(format!(
                        "{} must be greater than 0",
                        key
                    )));
                }

                Ok(parsed)
            }
            _ => Ok(default),
        }
    }

    /// Parse f64 from environment variable or return default
    fn parse_f64_or_default(key: &str, default: f64) -> Result<f64, FirewallError> {
        match env::var(key) {
            Ok(value) => value.parse::<f64>().map_err(|e| {
                FirewallError::ConfigurationError(format!(
                    "Invalid {} value '{}': {}",
                    key, value, e
                ))
            }),
            _ => Ok(default),
        }
    }

    /// Validate all configuration values
    fn validate(&self) -> Result<(), FirewallError> {
        if self.port == 0 {
            return Err(FirewallError::ConfigurationError(format!(
                "Invalid PORT value '{}': must be between 1 and 65535",
                self.port
            )));
        }

        Self::validate_file_path(&self.policies_yaml_path, "Policies YAML file")?;

        if !(0.0..=1.0).contains(&self.entity_confidence_threshold) {
            return Err(FirewallError::ConfigurationError(format!(
                "Invalid ENTITY_CONFIDENCE_THRESHOLD '{}': must be in [0, 1]",
                self.entity_confidence_threshold
            )));
        }

        Self::validate_log_level(&self.log_level)?;
        Self::validate_log_format(&self.log_format)?;

        Ok(())
    }

    /// Validate that a file path exists and is readable
    fn validate_file_path(path: &PathBuf, description: &str) -> Result<(), FirewallError> {
        if !path.exists() {
            return Err(FirewallError::ConfigurationError(format!(
                "{} not found at {:?}",
                description, path
            )));
        }

        if !path.is_file() {
            return Err(FirewallError::ConfigurationError(format!(
                "{} is not a file: {:?}",
                description, path
            )));
        }

        std::fs::File::open(path).map_err(|e| {
            FirewallError::ConfigurationError(format!(
                "Cannot read {} at {:?}: {}",
                description, path, e
            ))
        })?;

        Ok(())
    }

    /// Validate log level
    fn validate_log_level(level: &str) -> Result<(), FirewallError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(FirewallError::ConfigurationError(format!(
                "Invalid LOG_LEVEL '{}': must be one of {}",
                level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    /// Validate log format
    fn validate_log_format(format: &str) -> Result<(), FirewallError> {
        if format != "json" && format != "text" {
            return Err(FirewallError::ConfigurationError(format!(
                "Invalid LOG_FORMAT '{}': must be 'json' or 'text'",
                format
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Create a test configuration for unit tests
    ///
    /// This bypasses environment variable loading and file validation
    /// for use in tests that don't need real configuration.
    pub fn test_config() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            policies_yaml_path: PathBuf::from("/tmp/test_policies.yaml"),
            entity_confidence_threshold: 0.75,
            max_prompt_chars: 10_000,
            history_window_days: 7,
            request_timeout_secs: 30,
            body_size_limit_bytes: 2 * 1024 * 1024,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
        }
    }
}
