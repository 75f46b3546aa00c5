//! Canonical media result types.
//!
//! Both source parsers converge to these types, whatever the upstream
//! schema looked like. The pipeline's final answer is a [`Resolution`].

use serde::Serialize;

use super::headers::HeaderMap;
use super::link::AwemeId;

/// Classified upstream rejection, translated from heterogeneous upstream
/// error strings by each parser's own lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    ContentUnavailable,
    AccountPrivate,
    UnsupportedPostType,
    GeoRestricted,
    UpstreamUnavailable,
    /// Status message absent from the parser's table, kept verbatim so
    /// operators can extend the table later.
    Unknown(String),
}

/// An expected upstream rejection.
///
/// `detail` always carries the raw upstream status message, even when the
/// kind is classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub kind: FailureKind,
    pub detail: String,
}

impl Rejection {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// A single video post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoPost {
    /// Direct play address
    pub url: String,

    /// Soundtrack URL, when the post carries an audio section
    pub audio_url: Option<String>,

    /// Headers required to fetch the media (cookies, referer, user agent)
    pub headers: HeaderMap,

    /// Age-gated pages never expose a playable URL directly; the
    /// orchestrator re-points these at the direct-play template
    pub age_restricted: bool,
}

/// A photo-set post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePost {
    /// Image URLs in original post order, never chunked here
    pub urls: Vec<String>,

    /// Soundtrack URL, when the post carries an audio section
    pub audio_url: Option<String>,

    /// Headers required to fetch the media
    pub headers: HeaderMap,
}

/// Media extracted from one post. Exactly one variant per success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PostMedia {
    Video(VideoPost),
    Images(ImagePost),
}

/// What a source parser produced for one content ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseOutcome {
    /// Post fetched and mapped to the canonical schema
    Media(PostMedia),

    /// Upstream refused the request for an expected reason
    Rejected(Rejection),
}

/// Terminal answer of the resolution pipeline for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Resolution {
    /// No TikTok link in the text; not an error, callers drop it silently
    Ignored,

    /// A link was present but could not be resolved to a canonical URL
    NotRecognized,

    /// Canonical URL carried no parseable 19-digit content ID
    IdNotFound,

    /// Upstream rejected the post
    Rejected(Rejection),

    /// Post resolved to playable media
    Media { id: AwemeId, media: PostMedia },
}
