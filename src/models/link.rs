//! Located links and content identifiers.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Which TikTok domain a located link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DomainVariant {
    /// `www.tiktok.com` - already canonical, no redirect needed
    Primary,
    /// `vm.tiktok.com` / `vt.tiktok.com` - must be resolved via a redirect probe
    Short,
}

/// A TikTok link located inside free-form text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TikTokLink {
    /// Matched URL with the `https://` scheme prefixed
    pub url: String,

    /// Domain classification of the matched host
    pub variant: DomainVariant,
}

/// 19-digit numeric identifier of one post, stable across all sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AwemeId(u64);

impl AwemeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AwemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AwemeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}
