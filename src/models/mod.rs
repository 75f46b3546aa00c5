// src/models/mod.rs

//! Domain models for the resolver.
//!
//! This module contains all data structures used throughout the
//! application, organized by their primary purpose.

mod config;
mod headers;
mod link;
mod media;

// Re-export all public types
pub use config::{ApiIdentity, Config, DeliveryConfig, HttpConfig, RetryConfig};
pub use headers::HeaderMap;
pub use link::{AwemeId, DomainVariant, TikTokLink};
pub use media::{FailureKind, ImagePost, ParseOutcome, PostMedia, Rejection, Resolution, VideoPost};
