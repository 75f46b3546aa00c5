//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Transient-failure retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Device identity for the private mobile API
    #[serde(default)]
    pub api: ApiIdentity,

    /// Delivery-layer settings, passed through untouched by the pipeline
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds, applied to every upstream call
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Bounded retry settings for transient upstream failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per upstream request
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Base delay between attempts in milliseconds (doubles per attempt)
    #[serde(default = "defaults::base_delay")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            base_delay_ms: defaults::base_delay(),
        }
    }
}

/// Device identity parameters for the private mobile API.
///
/// Both values appear after installing the mobile application and are
/// required before the API parser can issue any request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiIdentity {
    /// Install ID (`iid` request parameter)
    #[serde(default)]
    pub install_id: String,

    /// Device ID (`device_id` request parameter)
    #[serde(default)]
    pub device_id: String,
}

impl ApiIdentity {
    /// Whether both required identifiers are present.
    pub fn is_complete(&self) -> bool {
        !self.install_id.trim().is_empty() && !self.device_id.trim().is_empty()
    }
}

/// Settings consumed by the delivery layer, not by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeliveryConfig {
    /// Bot credential
    #[serde(default)]
    pub bot_token: String,

    /// Operator contact for forwarding unclassified upstream errors
    #[serde(default)]
    pub owner_chat: String,
}

mod defaults {
    pub fn timeout() -> u64 {
        30
    }

    pub fn max_attempts() -> u32 {
        3
    }

    pub fn base_delay() -> u64 {
        500
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 500);
        assert!(!config.api.is_complete());
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [http]
            timeout_secs = 10

            [api]
            install_id = "7123456789"
            device_id = "7987654321"
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.retry.max_attempts, 3); // section omitted, default kicks in
        assert!(config.api.is_complete());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_identity_requires_both_ids() {
        let identity = ApiIdentity {
            install_id: "123".into(),
            device_id: String::new(),
        };
        assert!(!identity.is_complete());
    }
}
