// src/utils/http.rs

//! HTTP client utilities.
//!
//! Each parser call builds its own client, so no session state leaks
//! between requests. Every client carries the configured timeout; an
//! unresponsive upstream must never block the service indefinitely.

use std::time::Duration;

use reqwest::redirect;

use crate::error::Result;
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Create a client that never follows redirects.
///
/// Used for the short-link probe, which must read the `Location` header
/// from the redirect response instead of following it.
pub fn create_probe_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(redirect::Policy::none())
        .build()?;
    Ok(client)
}
