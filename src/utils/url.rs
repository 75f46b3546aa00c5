// src/utils/url.rs

//! Link locating and content-ID extraction.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{AwemeId, DomainVariant, TikTokLink};

/// A TikTok host followed by a non-whitespace path.
const LINK_PATTERN: &str = r"((?:www|vm|vt)\.tiktok\.com)/[^\s]+";

/// One of the three known path segments followed by exactly 19 digits.
const AWEME_ID_PATTERN: &str = r"(?:video|photo|v)/(\d{19})";

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LINK_PATTERN).expect("link pattern is valid"))
}

fn aweme_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(AWEME_ID_PATTERN).expect("aweme id pattern is valid"))
}

/// Find the first TikTok link in arbitrary text.
///
/// Returns `None` when the text carries no recognizable link; callers
/// silently ignore such messages. A host matched by the pattern but not in
/// the known set is also a non-match, never an error.
pub fn locate(text: &str) -> Option<TikTokLink> {
    let captures = link_regex().captures(text)?;
    let variant = match &captures[1] {
        "www.tiktok.com" => DomainVariant::Primary,
        "vm.tiktok.com" | "vt.tiktok.com" => DomainVariant::Short,
        _ => return None,
    };

    Some(TikTokLink {
        url: format!("https://{}", &captures[0]),
        variant,
    })
}

/// Extract the 19-digit aweme ID from a canonical URL.
///
/// Total and deterministic; any URL shape without one of the known
/// segments immediately followed by 19 decimal digits yields `None`.
pub fn extract_aweme_id(url: &str) -> Option<AwemeId> {
    let captures = aweme_id_regex().captures(url)?;
    captures[1].parse().ok()
}
