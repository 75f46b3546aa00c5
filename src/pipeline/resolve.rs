// src/pipeline/resolve.rs

//! Resolution orchestrator.
//!
//! Owns the sequence: locate the link, resolve short-link redirects,
//! extract the content ID, run the web parser, and apply the escalation
//! rules for geo- and age-restricted content. Strictly sequential; at
//! most two network calls per message.

use std::sync::Arc;

use reqwest::Method;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    AwemeId, Config, DomainVariant, FailureKind, HeaderMap, ParseOutcome, PostMedia, Rejection,
    Resolution, TikTokLink, VideoPost,
};
use crate::services::{SourceParser, WebPageParser};
use crate::utils::http;
use crate::utils::url as url_utils;

/// Third-party direct-play template, the escape hatch for geo-blocked and
/// age-gated content the web page refuses to expose a playable URL for.
const DIRECT_PLAY_TEMPLATE: &str = "https://www.tikwm.com/video/media/play/";

/// HD variant of the template; the delivery layer offers it as a link
/// fallback when the binary upload is rejected as too large.
const DIRECT_PLAY_HD_TEMPLATE: &str = "https://www.tikwm.com/video/media/hdplay/";

/// Direct-play URL for a content ID.
pub fn direct_play_url(id: AwemeId) -> String {
    format!("{DIRECT_PLAY_TEMPLATE}{id}.mp4")
}

/// HD direct-play URL for a content ID.
pub fn direct_play_hd_url(id: AwemeId) -> String {
    format!("{DIRECT_PLAY_HD_TEMPLATE}{id}.mp4")
}

/// Drives one message through the resolution pipeline.
///
/// Each call handles one message and keeps no state between calls;
/// concurrent messages run independent `resolve` futures safely.
pub struct Resolver {
    config: Arc<Config>,
    web: WebPageParser,
}

impl Resolver {
    pub fn new(config: Arc<Config>) -> Self {
        let web = WebPageParser::new(&config);
        Self { config, web }
    }

    /// Resolve a free-form chat message into a terminal [`Resolution`].
    pub async fn resolve(&self, text: &str) -> Result<Resolution> {
        // no link is not an error; the chat is full of unrelated messages
        let Some(link) = url_utils::locate(text) else {
            return Ok(Resolution::Ignored);
        };

        let Some(canonical) = self.resolve_redirect(&link).await else {
            return Ok(Resolution::NotRecognized);
        };

        let Some(id) = url_utils::extract_aweme_id(&canonical) else {
            log::warn!("[resolve] no aweme id in canonical URL [{canonical}]");
            return Ok(Resolution::IdNotFound);
        };

        log::debug!("[resolve] parsing {id} via web page");
        let outcome = self.web.parse(id).await?;
        Ok(apply_escalation(id, outcome))
    }

    /// Turn a located link into its canonical long-form URL.
    ///
    /// Primary-domain links are already canonical and pass through with
    /// zero network calls; short links get exactly one non-following
    /// probe. Any probe failure is a hard "not a recognizable link".
    async fn resolve_redirect(&self, link: &TikTokLink) -> Option<String> {
        match link.variant {
            DomainVariant::Primary => Some(link.url.clone()),
            DomainVariant::Short => match self.probe_short_link(&link.url).await {
                Ok(url) => Some(url),
                Err(error) => {
                    log::warn!("[resolve] short-link probe failed for {}: {error}", link.url);
                    None
                }
            },
        }
    }

    async fn probe_short_link(&self, url: &str) -> Result<String> {
        let client = http::create_probe_client(&self.config.http)?;
        let response = client.request(Method::OPTIONS, url).send().await?;

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::parse("short link", "redirect response carried no Location header")
            })?;

        // reject redirect targets that are not URLs at all
        Url::parse(location)?;
        Ok(location.to_string())
    }
}

/// Apply the orchestrator's escalation rules to a web-parser outcome.
///
/// Geo-restricted rejections and age-restricted successes are both served
/// through the direct-play template instead of being surfaced as-is; the
/// page never exposes a playable URL for either.
fn apply_escalation(id: AwemeId, outcome: ParseOutcome) -> Resolution {
    match outcome {
        ParseOutcome::Rejected(Rejection {
            kind: FailureKind::GeoRestricted,
            ..
        }) => Resolution::Media {
            id,
            media: PostMedia::Video(VideoPost {
                url: direct_play_url(id),
                audio_url: None,
                headers: HeaderMap::new(),
                age_restricted: false,
            }),
        },

        ParseOutcome::Rejected(rejection) => Resolution::Rejected(rejection),

        ParseOutcome::Media(PostMedia::Video(mut video)) if video.age_restricted => {
            video.url = direct_play_url(id);
            Resolution::Media {
                id,
                media: PostMedia::Video(video),
            }
        }

        ParseOutcome::Media(media) => Resolution::Media { id, media },
    }
}
