// src/services/retry.rs

//! Bounded retry policy for transient upstream failures.
//!
//! Both parsers treat an empty response body and gateway-timeout class
//! statuses as retriable. The upstream behavior being modeled retried
//! these indefinitely, which loops forever when credentials are wrong or
//! the service is down; the attempt cap and backoff here are a deliberate
//! strengthening of that behavior.

use std::time::Duration;

use crate::models::RetryConfig;

/// Capped attempt count with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            // attempt cap of at least 1, or nothing would ever be sent
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Total number of attempts allowed per request.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after the given zero-based attempt fails.
    ///
    /// Doubles per attempt: base, 2x base, 4x base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Sleep out the backoff delay for a failed attempt.
    pub async fn back_off(&self, attempt: u32) {
        tokio::time::sleep(self.delay_for(attempt)).await;
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&RetryConfig::default())
    }
}
