// src/services/mod.rs

//! Source parsers.
//!
//! Two interchangeable upstream data sources sit behind the
//! [`SourceParser`] capability: the public web page and the private mobile
//! API. Each is fully self-contained; the orchestrator calls `parse` and
//! interprets the outcome without reaching into parser internals.

pub mod api;
pub mod retry;
pub mod web;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AwemeId, ParseOutcome};

pub use api::MobileApiParser;
pub use retry::RetryPolicy;
pub use web::WebPageParser;

/// Capability shared by all source parsers: fetch one post by content ID
/// and normalize it into the canonical result.
///
/// Implementations own their HTTP session per call and keep no mutable
/// state between calls. Expected upstream rejections come back as
/// [`ParseOutcome::Rejected`]; only schema violations and transport
/// failures surface as errors.
#[async_trait]
pub trait SourceParser {
    async fn parse(&self, id: AwemeId) -> Result<ParseOutcome>;
}
