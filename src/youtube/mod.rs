//! YouTube Data API v3 client and helpers around yt-dlp.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use std::sync::Arc;

pub mod urls;
pub mod ytdlp;

pub use urls::{is_video_id, playlist_id_from_url, video_id_from_url};
pub use ytdlp::YtDlp;

use crate::extractors::{DetailApi, ListApi, PageItem, VideoDetails, VideoPage, PAGE_SIZE};
use crate::{Result, ScribeError};

/// Default endpoint of the YouTube Data API
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    published_at: Option<String>,
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: ResourceId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    snippet: Snippet,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

/// Client for the parts of the YouTube Data API this tool needs
pub struct YouTubeClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_API_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("yt-scribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(endpoint, ?query, "YouTube API request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Request to YouTube {} endpoint failed", endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScribeError::YouTubeApi {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse YouTube {} response", endpoint))
    }

    /// Check that a channel id refers to an existing channel
    pub async fn channel_exists(&self, channel_id: &str) -> Result<bool> {
        let response: ListResponse<IgnoredAny> = self
            .get("channels", &[("part", "snippet"), ("id", channel_id)])
            .await?;
        Ok(!response.items.is_empty())
    }

    /// Check that a playlist id refers to an existing, visible playlist
    pub async fn playlist_exists(&self, playlist_id: &str) -> Result<bool> {
        let response: ListResponse<IgnoredAny> = self
            .get("playlists", &[("part", "snippet"), ("id", playlist_id)])
            .await?;
        Ok(!response.items.is_empty())
    }

    /// One page of a channel's videos, newest first
    pub async fn list_channel_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> Result<VideoPage> {
        let max_results = PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("channelId", channel_id),
            ("type", "video"),
            ("order", "date"),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response: ListResponse<SearchResult> = self.get("search", &query).await?;

        let items = response
            .items
            .into_iter()
            .map(|result| {
                let snippet = result.snippet.unwrap_or_default();
                PageItem {
                    video_id: result.id.video_id,
                    title: snippet.title,
                    published_at: snippet.published_at,
                }
            })
            .collect();

        Ok(VideoPage {
            items,
            next_page_token: response.next_page_token,
        })
    }

    /// One page of a playlist's entries, in playlist order
    pub async fn list_playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<VideoPage> {
        let max_results = PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response: ListResponse<PlaylistItem> = self.get("playlistItems", &query).await?;

        let items = response
            .items
            .into_iter()
            .map(|item| match item.snippet {
                Some(snippet) => PageItem {
                    video_id: snippet.resource_id.and_then(|r| r.video_id),
                    title: snippet.title,
                    published_at: snippet.published_at,
                },
                None => PageItem::default(),
            })
            .collect();

        Ok(VideoPage {
            items,
            next_page_token: response.next_page_token,
        })
    }

    /// Title, publish date and duration of a video; `None` if it does not exist or is private
    pub async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
        let response: ListResponse<VideoResource> = self
            .get("videos", &[("part", "snippet,contentDetails"), ("id", video_id)])
            .await?;

        let Some(video) = response.items.into_iter().next() else {
            return Ok(None);
        };

        let duration_seconds = parse_iso8601_duration(&video.content_details.duration)
            .with_context(|| {
                format!(
                    "Unrecognised duration '{}' for video {}",
                    video.content_details.duration, video.id
                )
            })?;

        Ok(Some(VideoDetails {
            id: video.id,
            title: video.snippet.title,
            published_at: video.snippet.published_at,
            duration_seconds,
        }))
    }
}

#[async_trait]
impl DetailApi for YouTubeClient {
    async fn get_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
        self.video_details(video_id).await
    }
}

/// Channel uploads listed through the search endpoint
pub struct ChannelListing(pub Arc<YouTubeClient>);

#[async_trait]
impl ListApi for ChannelListing {
    async fn list_page(&self, channel_id: &str, page_token: Option<String>) -> Result<VideoPage> {
        self.0.list_channel_page(channel_id, page_token.as_deref()).await
    }
}

/// Playlist entries listed through the playlistItems endpoint
pub struct PlaylistListing(pub Arc<YouTubeClient>);

#[async_trait]
impl ListApi for PlaylistListing {
    async fn list_page(&self, playlist_id: &str, page_token: Option<String>) -> Result<VideoPage> {
        self.0.list_playlist_page(playlist_id, page_token.as_deref()).await
    }
}

/// Convert an ISO 8601 duration as used by YouTube (`PT1H2M3S`, `P1DT2H`, `P0D`) to seconds
pub fn parse_iso8601_duration(duration: &str) -> Option<u64> {
    let rest = duration.strip_prefix('P')?;

    let mut seconds = 0f64;
    let mut number = String::new();
    let mut in_time = false;

    for c in rest.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'T' if !in_time && number.is_empty() => in_time = true,
            unit => {
                let value: f64 = number.parse().ok()?;
                number.clear();

                let multiplier = match (in_time, unit) {
                    (false, 'W') => 7.0 * 86_400.0,
                    (false, 'D') => 86_400.0,
                    (true, 'H') => 3_600.0,
                    (true, 'M') => 60.0,
                    (true, 'S') => 1.0,
                    _ => return None,
                };
                seconds += value * multiplier;
            }
        }
    }

    if !number.is_empty() {
        return None;
    }

    // Round up so a fractional second past the shorts limit still counts
    Some(seconds.ceil() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{ChannelSource, VideoRecord, VideoSource};
    use futures_util::TryStreamExt;
    use serde_json::json;
    use tokio_test::assert_ok;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> YouTubeClient {
        YouTubeClient::with_base_url("test-key", server.uri()).unwrap()
    }

    #[test]
    fn test_parse_iso8601_duration() {
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("PT1M"), Some(60));
        assert_eq!(parse_iso8601_duration("PT1M1S"), Some(61));
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration("P1DT2H"), Some(93_600));
        assert_eq!(parse_iso8601_duration("P0D"), Some(0));
        assert_eq!(parse_iso8601_duration("PT1.5S"), Some(2));
    }

    #[test]
    fn test_fractional_minute_is_not_a_short() {
        let seconds = parse_iso8601_duration("PT60.5S").unwrap();
        assert_eq!(seconds, 61);
        assert!(!crate::filter::is_short(seconds));
        assert!(crate::filter::is_short(parse_iso8601_duration("PT60S").unwrap()));
    }

    #[test]
    fn test_parse_iso8601_duration_rejects_garbage() {
        assert_eq!(parse_iso8601_duration(""), None);
        assert_eq!(parse_iso8601_duration("1H"), None);
        assert_eq!(parse_iso8601_duration("PT5"), None);
        assert_eq!(parse_iso8601_duration("PT5X"), None);
        assert_eq!(parse_iso8601_duration("P1Y"), None);
    }

    #[tokio::test]
    async fn test_list_channel_page_requests_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("channelId", "UC123"))
            .and(query_param("type", "video"))
            .and(query_param("order", "date"))
            .and(query_param("maxResults", "50"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "nextPageToken": "CDIQAA",
                "items": [
                    {
                        "id": { "kind": "youtube#video", "videoId": "aaaaaaaaaaa" },
                        "snippet": { "title": "Newest", "publishedAt": "2024-02-01T10:00:00Z" }
                    },
                    {
                        "id": { "kind": "youtube#channel", "channelId": "UC123" },
                        "snippet": { "title": "The channel itself" }
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = assert_ok!(client(&server).await.list_channel_page("UC123", None).await);

        assert_eq!(page.next_page_token.as_deref(), Some("CDIQAA"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].video_id.as_deref(), Some("aaaaaaaaaaa"));
        assert_eq!(page.items[0].published_at.as_deref(), Some("2024-02-01T10:00:00Z"));
        assert_eq!(page.items[1].video_id, None);
    }

    #[tokio::test]
    async fn test_channel_source_walks_all_pages() {
        let server = MockServer::start().await;

        // Mounted first so it wins over the catch-all first page below
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("pageToken", "PAGE2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "id": { "videoId": "ccccccccccc" }, "snippet": { "title": "Third" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "nextPageToken": "PAGE2",
                "items": [
                    { "id": { "videoId": "aaaaaaaaaaa" }, "snippet": { "title": "First" } },
                    { "id": { "videoId": "bbbbbbbbbbb" }, "snippet": { "title": "Second" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let listing = ChannelListing(Arc::new(client(&server).await));
        let source = ChannelSource::new(Arc::new(listing), "UC123");

        let videos: Vec<VideoRecord> = source.stream().try_collect().await.unwrap();
        let titles: Vec<&str> = videos.iter().map(|v| v.title.as_str()).collect();

        assert_eq!(titles, ["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_list_playlist_page_keeps_unavailable_entries_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .and(query_param("playlistId", "PL1"))
            .and(query_param("pageToken", "NEXT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {
                        "snippet": {
                            "title": "Kept",
                            "publishedAt": "2023-01-05T00:00:00Z",
                            "resourceId": { "kind": "youtube#video", "videoId": "ddddddddddd" }
                        }
                    },
                    { "snippet": { "title": "Deleted video", "resourceId": {} } },
                    { "id": "no-snippet" }
                ]
            })))
            .mount(&server)
            .await;

        let page = client(&server)
            .await
            .list_playlist_page("PL1", Some("NEXT"))
            .await
            .unwrap();

        assert_eq!(page.next_page_token, None);
        let ids: Vec<Option<&str>> = page.items.iter().map(|i| i.video_id.as_deref()).collect();
        assert_eq!(ids, [Some("ddddddddddd"), None, None]);
    }

    #[tokio::test]
    async fn test_api_error_is_reported_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .list_channel_page("UC123", None)
            .await
            .unwrap_err();

        match err.downcast_ref::<ScribeError>() {
            Some(ScribeError::YouTubeApi { status, body }) => {
                assert_eq!(*status, 403);
                assert!(body.contains("quotaExceeded"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_video_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", "eeeeeeeeeee"))
            .and(query_param("part", "snippet,contentDetails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "eeeeeeeeeee",
                    "snippet": { "title": "A talk", "publishedAt": "2023-03-01T09:00:00Z" },
                    "contentDetails": { "duration": "PT4M13S" }
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let client = client(&server).await;

        let details = client.video_details("eeeeeeeeeee").await.unwrap().unwrap();
        assert_eq!(details.title, "A talk");
        assert_eq!(details.duration_seconds, 253);

        assert_eq!(client.get_details("fffffffffff").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_existence_checks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("id", "UCreal"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "UCreal", "snippet": { "title": "Real" } }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pageInfo": { "totalResults": 0 }
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;

        assert!(client.channel_exists("UCreal").await.unwrap());
        assert!(!client.channel_exists("UCfake").await.unwrap());
    }
}
