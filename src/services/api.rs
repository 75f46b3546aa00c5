// src/services/api.rs

//! Private mobile-API parser.
//!
//! Authenticates against the unofficial mobile endpoint with static
//! device-identity parameters. The default orchestration path does not
//! call this parser live (the direct-play template is cheaper), but it
//! stays available as an independent data source.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{
    ApiIdentity, AwemeId, Config, FailureKind, HeaderMap, HttpConfig, ImagePost, ParseOutcome,
    PostMedia, Rejection, VideoPost,
};
use crate::services::{RetryPolicy, SourceParser};
use crate::utils::http;

const API_URL: &str = "https://api16-normal-c-useast1a.tiktokv.com/aweme/v1/multi/aweme/detail/";

const USER_AGENT: &str = "com.zhiliaoapp.musically/2023501030 (Linux; U; Android 14; en_US; Pixel 8 Pro; Build/TP1A.220624.014;tt-ok/3.12.13.4-tiktok)";

/// Static app-identity parameters sent alongside the device identity.
const STATIC_PARAMS: &[(&str, &str)] = &[
    ("channel", "googleplay"),
    ("aid", "1233"),
    ("app_name", "musical_ly"),
    ("version_code", "350103"),
    ("version_name", "35.1.3"),
    ("device_platform", "android"),
    ("device_type", "Pixel 8 Pro"),
    ("os_version", "14"),
];

/// `is_bytevc1` value marking the proprietary codec to skip.
const PROPRIETARY_CODEC: i64 = 2;

/// This parser's raw-string table, distinct from the web parser's.
fn classify(raw: &str) -> FailureKind {
    match raw {
        "Video has been removed" => FailureKind::ContentUnavailable,
        "Server is currently unavailable. Please try again later." => {
            FailureKind::UpstreamUnavailable
        }
        other => FailureKind::Unknown(other.to_string()),
    }
}

/// Parser backed by the unofficial mobile API.
pub struct MobileApiParser {
    identity: ApiIdentity,
    http: HttpConfig,
    retry: RetryPolicy,
}

impl MobileApiParser {
    /// Build the parser, failing when the device identity is incomplete.
    ///
    /// Checked once at construction; a missing identifier is a start-up
    /// configuration error, never a per-call failure.
    pub fn new(config: &Config) -> Result<Self> {
        if !config.api.is_complete() {
            return Err(AppError::config(
                "api.install_id and api.device_id are required for the mobile API parser",
            ));
        }

        Ok(Self {
            identity: config.api.clone(),
            http: config.http.clone(),
            retry: RetryPolicy::new(&config.retry),
        })
    }

    fn decode(body: &str) -> Result<ParseOutcome> {
        let root: schema::Root = serde_json::from_str(body)?;

        if root.status_code != 0 {
            return Ok(ParseOutcome::Rejected(Rejection::new(
                classify(&root.status_msg),
                root.status_msg,
            )));
        }

        let detail = root
            .aweme_details
            .into_iter()
            .next()
            .ok_or_else(|| AppError::parse("mobile api", "aweme_details is empty on success"))?;

        Ok(map_detail(detail))
    }
}

#[async_trait]
impl SourceParser for MobileApiParser {
    async fn parse(&self, id: AwemeId) -> Result<ParseOutcome> {
        let client = http::create_client(&self.http)?;

        let params: Vec<(&str, &str)> = [
            ("iid", self.identity.install_id.as_str()),
            ("device_id", self.identity.device_id.as_str()),
        ]
        .into_iter()
        .chain(STATIC_PARAMS.iter().copied())
        .collect();

        for attempt in 0..self.retry.max_attempts() {
            let response = client
                .post(API_URL)
                .query(&params)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                // has to be present; the server never checks its value
                .header("X-Argus", "")
                .form(&[("aweme_ids", format!("[{id}]"))])
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;

            // gateway timeouts and empty bodies happen from time to time
            let transient = if status == reqwest::StatusCode::GATEWAY_TIMEOUT {
                Some("HTTP 504")
            } else if body.trim().is_empty() {
                Some("empty response body")
            } else {
                None
            };

            if let Some(reason) = transient {
                log::warn!(
                    "[api] {reason} for {id} (attempt {}/{})",
                    attempt + 1,
                    self.retry.max_attempts()
                );
                if attempt + 1 < self.retry.max_attempts() {
                    self.retry.back_off(attempt).await;
                }
                continue;
            }

            return Self::decode(&body);
        }

        Ok(ParseOutcome::Rejected(Rejection::new(
            FailureKind::UpstreamUnavailable,
            "mobile api kept returning transient responses",
        )))
    }
}

fn map_detail(detail: schema::AwemeDetail) -> ParseOutcome {
    // audio is absent when the item carries no music section
    let audio_url = detail.music.map(|music| music.play_url.uri);

    if let Some(info) = detail.image_post_info {
        let urls: Vec<String> = info
            .images
            .into_iter()
            // last entry is the non-HEIC variant
            .filter_map(|image| image.display_image.url_list.into_iter().next_back())
            .collect();
        if !urls.is_empty() {
            return ParseOutcome::Media(PostMedia::Images(ImagePost {
                urls,
                audio_url,
                headers: HeaderMap::new(),
            }));
        }
    }

    if let Some(url) = select_video_url(&detail.video) {
        return ParseOutcome::Media(PostMedia::Video(VideoPost {
            url,
            audio_url,
            headers: HeaderMap::new(),
            age_restricted: false,
        }));
    }

    ParseOutcome::Rejected(Rejection::new(
        FailureKind::UnsupportedPostType,
        "item carries neither video nor images",
    ))
}

/// Prefer the first bitrate entry not encoded with the proprietary codec
/// (better quality for the size); fall back to the default play address.
fn select_video_url(video: &schema::Video) -> Option<String> {
    for entry in &video.bit_rate {
        let eligible = matches!(entry.is_bytevc1, Some(value) if value != PROPRIETARY_CODEC);
        if eligible {
            if let Some(url) = entry.play_addr.url_list.first() {
                return Some(url.clone());
            }
        }
    }
    video.play_addr.url_list.first().cloned()
}

/// Mobile-API JSON schema, snake_case as served by the endpoint.
mod schema {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Root {
        pub status_code: i64,
        #[serde(default)]
        pub status_msg: String,
        #[serde(default)]
        pub aweme_details: Vec<AwemeDetail>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AwemeDetail {
        #[serde(default)]
        pub video: Video,
        pub music: Option<Music>,
        pub image_post_info: Option<ImagePostInfo>,
    }

    #[derive(Debug, Deserialize, Default)]
    pub struct Video {
        #[serde(default)]
        pub bit_rate: Vec<BitRate>,
        #[serde(default)]
        pub play_addr: PlayAddr,
    }

    #[derive(Debug, Deserialize)]
    pub struct BitRate {
        pub play_addr: PlayAddr,
        pub is_bytevc1: Option<i64>,
    }

    #[derive(Debug, Deserialize, Default)]
    pub struct PlayAddr {
        #[serde(default)]
        pub url_list: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Music {
        pub play_url: PlayUrl,
    }

    #[derive(Debug, Deserialize)]
    pub struct PlayUrl {
        pub uri: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ImagePostInfo {
        pub images: Vec<ImageItem>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ImageItem {
        pub display_image: DisplayImage,
    }

    #[derive(Debug, Deserialize)]
    pub struct DisplayImage {
        pub url_list: Vec<String>,
    }
}
