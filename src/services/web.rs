// src/services/web.rs

//! Web-page parser.
//!
//! Fetches the public video/photo page for a content ID and decodes the
//! JSON document embedded in the rehydration `<script>` block. The page
//! occasionally renders without that block under load, which counts as
//! transient and goes through the shared retry policy.

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    AwemeId, Config, FailureKind, HeaderMap, HttpConfig, ImagePost, ParseOutcome, PostMedia,
    Rejection, VideoPost,
};
use crate::services::{RetryPolicy, SourceParser};
use crate::utils::http;

const PAGE_URL: &str = "https://www.tiktok.com/@i/video/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

const REFERER: &str = "https://www.tiktok.com/";

/// Element wrapping the embedded JSON payload.
const REHYDRATION_SELECTOR: &str =
    r#"script[id="__UNIVERSAL_DATA_FOR_REHYDRATION__"][type="application/json"]"#;

/// This parser's raw-string table. Not interchangeable with the mobile
/// API's table; identical English phrases do not mean the same thing
/// across the two upstreams.
fn classify(raw: &str) -> FailureKind {
    match raw {
        "item doesn't exist"
        | "status_deleted"
        | "status_self_see"
        | "status_reviewing"
        | "status_audit_not_pass" => FailureKind::ContentUnavailable,
        "author_secret" => FailureKind::AccountPrivate,
        "item is storypost" => FailureKind::UnsupportedPostType,
        "cross_border_violation" => FailureKind::GeoRestricted,
        other => FailureKind::Unknown(other.to_string()),
    }
}

/// Parser backed by the public web page.
pub struct WebPageParser {
    http: HttpConfig,
    retry: RetryPolicy,
}

impl WebPageParser {
    pub fn new(config: &Config) -> Self {
        Self {
            http: config.http.clone(),
            retry: RetryPolicy::new(&config.retry),
        }
    }

    /// Decode an embedded JSON payload into the canonical result.
    fn decode(json: &str, headers: HeaderMap) -> Result<ParseOutcome> {
        let root: schema::Root = serde_json::from_str(json)?;
        let detail = root.default_scope.video_detail;

        if detail.status_code != 0 {
            return Ok(ParseOutcome::Rejected(Rejection::new(
                classify(&detail.status_msg),
                detail.status_msg,
            )));
        }

        let item = detail
            .item_info
            .ok_or_else(|| AppError::parse("web page", "itemInfo missing on success payload"))?
            .item_struct;

        Ok(map_item(item, headers))
    }
}

#[async_trait]
impl SourceParser for WebPageParser {
    async fn parse(&self, id: AwemeId) -> Result<ParseOutcome> {
        let client = http::create_client(&self.http)?;
        let url = format!("{PAGE_URL}{id}");

        for attempt in 0..self.retry.max_attempts() {
            let response = client
                .get(&url)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .send()
                .await?;

            // cookies authenticate the follow-up media fetches downstream
            let cookies = fold_cookies(&response);
            let body = response.text().await?;

            let Some(json) = extract_embedded_json(&body) else {
                log::warn!(
                    "[web] rehydration block missing for {id} (attempt {}/{})",
                    attempt + 1,
                    self.retry.max_attempts()
                );
                if attempt + 1 < self.retry.max_attempts() {
                    self.retry.back_off(attempt).await;
                }
                continue;
            };

            let mut headers = HeaderMap::from([("User-Agent", USER_AGENT)]);
            if !cookies.is_empty() {
                headers.insert("Cookie", cookies);
            }
            headers.insert("Referer", REFERER);

            return Self::decode(&json, headers);
        }

        Ok(ParseOutcome::Rejected(Rejection::new(
            FailureKind::UpstreamUnavailable,
            "page rendered without its embedded data block",
        )))
    }
}

/// Pull the JSON document out of the rehydration script element.
fn extract_embedded_json(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let selector = Selector::parse(REHYDRATION_SELECTOR).expect("rehydration selector is valid");
    let element = document.select(&selector).next()?;
    let text: String = element.text().collect();
    if text.trim().is_empty() {
        return None;
    }
    Some(text)
}

/// Fold response cookies into a single `Cookie` header value.
fn fold_cookies(response: &reqwest::Response) -> String {
    response
        .cookies()
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
        .collect::<Vec<_>>()
        .join("; ")
}

fn map_item(item: schema::ItemStruct, headers: HeaderMap) -> ParseOutcome {
    let audio_url = item.music.map(|music| music.play_url);

    if let Some(post) = item.image_post {
        let urls: Vec<String> = post
            .images
            .into_iter()
            .filter_map(|image| image.image_url.url_list.into_iter().next())
            .collect();
        if !urls.is_empty() {
            return ParseOutcome::Media(PostMedia::Images(ImagePost {
                urls,
                audio_url,
                headers,
            }));
        }
    }

    if let Some(url) = select_video_url(&item.video) {
        return ParseOutcome::Media(PostMedia::Video(VideoPost {
            url,
            audio_url,
            headers,
            age_restricted: item.is_content_classified,
        }));
    }

    ParseOutcome::Rejected(Rejection::new(
        FailureKind::UnsupportedPostType,
        "item carries neither video nor images",
    ))
}

/// Pick the playable video URL from the page's video section.
///
/// An absent `bitrateInfo` means the item has no video of its own (photo
/// set or audio post). The first `bitrateInfo` entry is the page's best
/// non-proprietary rendition; `playAddr` is the fallback.
fn select_video_url(video: &schema::Video) -> Option<String> {
    let info = video.bitrate_info.as_ref()?;
    info.first()
        .and_then(|entry| entry.play_addr.url_list.first().cloned())
        .or_else(|| video.play_addr.clone())
}

/// Page-specific JSON schema, field names as rendered by the web app.
mod schema {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Root {
        #[serde(rename = "__DEFAULT_SCOPE__")]
        pub default_scope: DefaultScope,
    }

    #[derive(Debug, Deserialize)]
    pub struct DefaultScope {
        #[serde(rename = "webapp.video-detail")]
        pub video_detail: VideoDetail,
    }

    #[derive(Debug, Deserialize)]
    pub struct VideoDetail {
        #[serde(rename = "statusCode")]
        pub status_code: i64,
        #[serde(rename = "statusMsg", default)]
        pub status_msg: String,
        #[serde(rename = "itemInfo")]
        pub item_info: Option<ItemInfo>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ItemInfo {
        #[serde(rename = "itemStruct")]
        pub item_struct: ItemStruct,
    }

    #[derive(Debug, Deserialize)]
    pub struct ItemStruct {
        #[serde(default)]
        pub video: Video,
        pub music: Option<Music>,
        #[serde(rename = "imagePost")]
        pub image_post: Option<ImagePostInfo>,
        #[serde(rename = "isContentClassified", default)]
        pub is_content_classified: bool,
    }

    #[derive(Debug, Deserialize, Default)]
    pub struct Video {
        #[serde(rename = "playAddr")]
        pub play_addr: Option<String>,
        #[serde(rename = "bitrateInfo")]
        pub bitrate_info: Option<Vec<BitrateInfo>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct BitrateInfo {
        #[serde(rename = "PlayAddr")]
        pub play_addr: PlayAddr,
    }

    #[derive(Debug, Deserialize)]
    pub struct PlayAddr {
        #[serde(rename = "UrlList")]
        pub url_list: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Music {
        #[serde(rename = "playUrl")]
        pub play_url: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ImagePostInfo {
        pub images: Vec<Image>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Image {
        #[serde(rename = "imageURL")]
        pub image_url: ImageUrl,
    }

    #[derive(Debug, Deserialize)]
    pub struct ImageUrl {
        #[serde(rename = "urlList")]
        pub url_list: Vec<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(json: &str) -> String {
        format!(
            "<html><head></head><body>\
             <script id=\"__UNIVERSAL_DATA_FOR_REHYDRATION__\" type=\"application/json\">{json}</script>\
             </body></html>"
        )
    }

    fn video_payload() -> String {
        serde_json::json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": {
                    "statusCode": 0,
                    "statusMsg": "",
                    "itemInfo": {
                        "itemStruct": {
                            "video": {
                                "playAddr": "https://v16.tiktokcdn.com/fallback.mp4",
                                "bitrateInfo": [
                                    {"PlayAddr": {"UrlList": ["https://v16.tiktokcdn.com/best.mp4"]}},
                                    {"PlayAddr": {"UrlList": ["https://v16.tiktokcdn.com/second.mp4"]}}
                                ]
                            },
                            "music": {"playUrl": "https://sf16.tiktokcdn.com/music.mp3"},
                            "isContentClassified": false
                        }
                    }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn test_extract_embedded_json() {
        let body = page_with(r#"{"a":1}"#);
        assert_eq!(extract_embedded_json(&body), Some(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn test_extract_embedded_json_missing_marker() {
        assert_eq!(extract_embedded_json("<html><body>loading...</body></html>"), None);
        assert_eq!(extract_embedded_json(""), None);
    }

    #[test]
    fn test_decode_video_takes_first_bitrate_entry() {
        let outcome = WebPageParser::decode(&video_payload(), HeaderMap::new()).unwrap();
        match outcome {
            ParseOutcome::Media(PostMedia::Video(video)) => {
                assert_eq!(video.url, "https://v16.tiktokcdn.com/best.mp4");
                assert_eq!(
                    video.audio_url.as_deref(),
                    Some("https://sf16.tiktokcdn.com/music.mp3")
                );
                assert!(!video.age_restricted);
            }
            other => panic!("expected video, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_age_restricted_flag() {
        let json = video_payload().replace(
            r#""isContentClassified":false"#,
            r#""isContentClassified":true"#,
        );
        let outcome = WebPageParser::decode(&json, HeaderMap::new()).unwrap();
        match outcome {
            ParseOutcome::Media(PostMedia::Video(video)) => assert!(video.age_restricted),
            other => panic!("expected video, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_photo_set_keeps_order_and_first_choice_urls() {
        let json = serde_json::json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": {
                    "statusCode": 0,
                    "itemInfo": {
                        "itemStruct": {
                            "imagePost": {
                                "images": (1..=12).map(|i| serde_json::json!({
                                    "imageURL": {"urlList": [
                                        format!("https://cdn/img{i}-a.jpeg"),
                                        format!("https://cdn/img{i}-b.jpeg")
                                    ]}
                                })).collect::<Vec<_>>()
                            },
                            "music": {"playUrl": "https://cdn/sound.mp3"}
                        }
                    }
                }
            }
        })
        .to_string();

        let outcome = WebPageParser::decode(&json, HeaderMap::new()).unwrap();
        match outcome {
            ParseOutcome::Media(PostMedia::Images(post)) => {
                assert_eq!(post.urls.len(), 12);
                assert_eq!(post.urls[0], "https://cdn/img1-a.jpeg");
                assert_eq!(post.urls[11], "https://cdn/img12-a.jpeg");
                assert_eq!(post.audio_url.as_deref(), Some("https://cdn/sound.mp3"));
            }
            other => panic!("expected images, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_nonzero_status_maps_through_table() {
        let json = serde_json::json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": {
                    "statusCode": 10222,
                    "statusMsg": "item doesn't exist"
                }
            }
        })
        .to_string();

        let outcome = WebPageParser::decode(&json, HeaderMap::new()).unwrap();
        assert_eq!(
            outcome,
            ParseOutcome::Rejected(Rejection::new(
                FailureKind::ContentUnavailable,
                "item doesn't exist"
            ))
        );
    }

    #[test]
    fn test_decode_unmapped_status_stays_verbatim() {
        let json = serde_json::json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": {
                    "statusCode": 10000,
                    "statusMsg": "brand new failure mode"
                }
            }
        })
        .to_string();

        let outcome = WebPageParser::decode(&json, HeaderMap::new()).unwrap();
        assert_eq!(
            outcome,
            ParseOutcome::Rejected(Rejection::new(
                FailureKind::Unknown("brand new failure mode".to_string()),
                "brand new failure mode"
            ))
        );
    }

    #[test]
    fn test_decode_geo_restriction() {
        let json = serde_json::json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": {
                    "statusCode": 10204,
                    "statusMsg": "cross_border_violation"
                }
            }
        })
        .to_string();

        let outcome = WebPageParser::decode(&json, HeaderMap::new()).unwrap();
        match outcome {
            ParseOutcome::Rejected(rejection) => {
                assert_eq!(rejection.kind, FailureKind::GeoRestricted);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_item_without_media_is_unsupported() {
        let json = serde_json::json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": {
                    "statusCode": 0,
                    "itemInfo": {"itemStruct": {}}
                }
            }
        })
        .to_string();

        let outcome = WebPageParser::decode(&json, HeaderMap::new()).unwrap();
        match outcome {
            ParseOutcome::Rejected(rejection) => {
                assert_eq!(rejection.kind, FailureKind::UnsupportedPostType);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_success_without_item_info_is_schema_violation() {
        let json = serde_json::json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": {"statusCode": 0}
            }
        })
        .to_string();

        assert!(WebPageParser::decode(&json, HeaderMap::new()).is_err());
    }

    #[test]
    fn test_select_video_url_falls_back_to_play_addr() {
        let video: super::schema::Video = serde_json::from_str(
            r#"{"playAddr": "https://cdn/fallback.mp4", "bitrateInfo": [{"PlayAddr": {"UrlList": []}}]}"#,
        )
        .unwrap();
        assert_eq!(
            select_video_url(&video).as_deref(),
            Some("https://cdn/fallback.mp4")
        );
    }

    #[test]
    fn test_select_video_url_none_without_bitrate_info() {
        let video: super::schema::Video =
            serde_json::from_str(r#"{"playAddr": "https://cdn/fallback.mp4"}"#).unwrap();
        assert_eq!(select_video_url(&video), None);
    }
}
