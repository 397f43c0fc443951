use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

pub mod channel;
pub mod playlist;
pub mod video;

pub use channel::ChannelSource;
pub use playlist::PlaylistSource;
pub use video::SingleVideoExtractor;

use crate::filter::VideoFilter;
use crate::Result;

/// Maximum number of items requested per page from list endpoints
pub const PAGE_SIZE: u32 = 50;

/// A discovered video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// YouTube video id
    pub id: String,

    /// Display title
    pub title: String,

    /// Publish timestamp as reported by the API (RFC 3339, UTC)
    pub published_at: Option<String>,

    /// Length in seconds, filled in when it had to be looked up
    pub duration: Option<u64>,
}

impl VideoRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        published_at: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            published_at,
            duration: None,
        }
    }

    /// Title for log and console messages
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "N/A"
        } else {
            &self.title
        }
    }

    /// Public watch URL of the video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// Extended information returned by a detail lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    pub published_at: Option<String>,
    pub duration_seconds: u64,
}

impl From<VideoDetails> for VideoRecord {
    fn from(details: VideoDetails) -> Self {
        Self {
            id: details.id,
            title: details.title,
            published_at: details.published_at,
            duration: Some(details.duration_seconds),
        }
    }
}

/// One entry of a list page. `video_id` is absent for deleted or private playlist entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageItem {
    pub video_id: Option<String>,
    pub title: String,
    pub published_at: Option<String>,
}

impl PageItem {
    fn into_record(self) -> Option<VideoRecord> {
        let id = self.video_id.filter(|id| !id.is_empty())?;
        Some(VideoRecord::new(id, self.title, self.published_at))
    }
}

/// A page of a paginated list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoPage {
    pub items: Vec<PageItem>,
    pub next_page_token: Option<String>,
}

/// Paginated listing of the videos in a collection (a channel or a playlist)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListApi: Send + Sync {
    /// Fetch one page; `page_token` is `None` for the first page
    async fn list_page(&self, collection_id: &str, page_token: Option<String>) -> Result<VideoPage>;
}

/// Lookup of extended video details
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DetailApi: Send + Sync {
    /// Returns `Ok(None)` when the video does not exist or is not visible
    async fn get_details(&self, video_id: &str) -> Result<Option<VideoDetails>>;
}

/// A collection of videos that can be walked lazily
pub trait VideoSource: Send + Sync {
    /// Start a fresh walk over the collection.
    ///
    /// Pages are fetched only as the stream is polled. A failed page fetch is yielded as an
    /// error and ends the stream.
    fn stream(&self) -> BoxStream<'_, Result<VideoRecord>>;

    /// Message shown once every video of the collection was processed
    fn success_message(&self) -> &'static str;

    /// How the videos end up ordered in the document
    fn sorting_note(&self) -> &'static str;
}

enum Cursor {
    Start,
    Next(String),
    Exhausted,
}

async fn next_page(
    api: &dyn ListApi,
    collection_id: &str,
    cursor: Cursor,
) -> Result<Option<(Vec<PageItem>, Cursor)>> {
    let page_token = match cursor {
        Cursor::Exhausted => return Ok(None),
        Cursor::Start => None,
        Cursor::Next(token) => Some(token),
    };

    tracing::debug!(collection = collection_id, page_token = ?page_token, "Requesting page");
    let page = api.list_page(collection_id, page_token).await?;

    let next = match page.next_page_token {
        Some(token) if !token.is_empty() => Cursor::Next(token),
        _ => Cursor::Exhausted,
    };

    Ok(Some((page.items, next)))
}

/// Walk every page of a collection, yielding one record per playable item
pub fn paginate<'a>(
    api: &'a dyn ListApi,
    collection_id: &'a str,
) -> BoxStream<'a, Result<VideoRecord>> {
    stream::try_unfold(Cursor::Start, move |cursor| next_page(api, collection_id, cursor))
        .map_ok(|items| {
            stream::iter(
                items
                    .into_iter()
                    .filter_map(PageItem::into_record)
                    .map(Ok::<_, anyhow::Error>),
            )
        })
        .try_flatten()
        .boxed()
}

/// Run a source through a filter, yielding accepted videos in source order
pub fn accepted_videos<'a>(
    source: &'a dyn VideoSource,
    filter: &'a VideoFilter,
) -> BoxStream<'a, Result<VideoRecord>> {
    source
        .stream()
        .try_filter_map(move |mut record| async move {
            let keep = filter.accept(&mut record).await;
            Ok::<_, anyhow::Error>(keep.then_some(record))
        })
        .boxed()
}

/// A channel or playlist paired with the filter chosen for it
pub struct Extractor {
    source: Box<dyn VideoSource>,
    filter: VideoFilter,
}

impl Extractor {
    pub fn new(source: Box<dyn VideoSource>, filter: VideoFilter) -> Self {
        Self { source, filter }
    }

    /// Lazily yield the videos that pass the filter
    pub fn videos(&self) -> BoxStream<'_, Result<VideoRecord>> {
        accepted_videos(self.source.as_ref(), &self.filter)
    }

    pub fn success_message(&self) -> &'static str {
        self.source.success_message()
    }

    pub fn sorting_note(&self) -> &'static str {
        self.source.sorting_note()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::filter::Period;
    use std::sync::Arc;

    pub(crate) fn page(first: usize, count: usize, next: Option<&str>) -> VideoPage {
        VideoPage {
            items: (first..first + count)
                .map(|n| PageItem {
                    video_id: Some(format!("vid-{}", n)),
                    title: format!("Video {}", n),
                    published_at: Some("2023-06-01T00:00:00Z".to_string()),
                })
                .collect(),
            next_page_token: next.map(str::to_string),
        }
    }

    fn item(id: &str, published_at: &str) -> PageItem {
        PageItem {
            video_id: Some(id.to_string()),
            title: format!("Title {}", id),
            published_at: Some(published_at.to_string()),
        }
    }

    fn details(id: &str, duration_seconds: u64) -> VideoDetails {
        VideoDetails {
            id: id.to_string(),
            title: format!("Title {}", id),
            published_at: None,
            duration_seconds,
        }
    }

    #[test]
    fn test_display_title_falls_back() {
        assert_eq!(VideoRecord::new("x", "", None).display_title(), "N/A");
        assert_eq!(VideoRecord::new("x", "Hi", None).display_title(), "Hi");
    }

    #[test]
    fn test_item_without_video_id_is_dropped() {
        let missing = PageItem {
            video_id: None,
            ..PageItem::default()
        };
        let empty = PageItem {
            video_id: Some(String::new()),
            ..PageItem::default()
        };

        assert!(missing.into_record().is_none());
        assert!(empty.into_record().is_none());
    }

    #[tokio::test]
    async fn test_paginate_follows_page_tokens_in_order() {
        let mut api = MockListApi::new();
        api.expect_list_page()
            .times(3)
            .returning(|collection, token| {
                assert_eq!(collection, "UC-test");
                Ok(match token.as_deref() {
                    None => page(0, 50, Some("page-2")),
                    Some("page-2") => page(50, 50, Some("page-3")),
                    Some("page-3") => page(100, 7, None),
                    other => panic!("unexpected page token {:?}", other),
                })
            });

        let records: Vec<VideoRecord> = paginate(&api, "UC-test").try_collect().await.unwrap();

        assert_eq!(records.len(), 107);
        for (n, record) in records.iter().enumerate() {
            assert_eq!(record.id, format!("vid-{}", n));
        }
    }

    #[tokio::test]
    async fn test_paginate_is_lazy() {
        let mut api = MockListApi::new();
        api.expect_list_page()
            .times(1)
            .returning(|_, _| Ok(page(0, 50, Some("page-2"))));

        let first: Vec<Result<VideoRecord>> = paginate(&api, "UC-test").take(10).collect().await;

        assert_eq!(first.len(), 10);
        assert!(first.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn test_paginate_continues_past_empty_page() {
        let mut api = MockListApi::new();
        api.expect_list_page()
            .times(2)
            .returning(|_, token| {
                Ok(match token {
                    None => page(0, 0, Some("page-2")),
                    Some(_) => page(0, 3, None),
                })
            });

        let records: Vec<VideoRecord> = paginate(&api, "PL").try_collect().await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_page_failure_is_surfaced_not_truncated() {
        let mut api = MockListApi::new();
        api.expect_list_page()
            .times(2)
            .returning(|_, token| match token {
                None => Ok(page(0, 50, Some("page-2"))),
                Some(_) => Err(anyhow::anyhow!("quotaExceeded")),
            });

        let results: Vec<Result<VideoRecord>> = paginate(&api, "UC-test").collect().await;

        assert_eq!(results.len(), 51);
        assert!(results[..50].iter().all(|r| r.is_ok()));
        let err = results[50].as_ref().unwrap_err();
        assert!(err.to_string().contains("quotaExceeded"));
    }

    #[tokio::test]
    async fn test_pipeline_keeps_only_accepted_videos() {
        let mut list = MockListApi::new();
        list.expect_list_page().times(1).returning(|_, _| {
            Ok(VideoPage {
                items: vec![
                    item("old", "2022-07-04T10:00:00Z"),
                    item("short", "2023-02-01T10:00:00Z"),
                    item("long", "2023-03-01T10:00:00Z"),
                ],
                next_page_token: None,
            })
        });

        let mut lookup = MockDetailApi::new();
        lookup
            .expect_get_details()
            .times(2)
            .returning(|id| match id {
                "short" => Ok(Some(details(id, 45))),
                "long" => Ok(Some(details(id, 300))),
                other => panic!("unexpected lookup for {}", other),
            });

        let period: Period = "01/01/2023-e".parse().unwrap();
        let extractor = Extractor::new(
            Box::new(ChannelSource::new(Arc::new(list), "UC-test")),
            VideoFilter::new(period, false, Arc::new(lookup)),
        );

        let videos: Vec<VideoRecord> = extractor.videos().try_collect().await.unwrap();

        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, "long");
        assert_eq!(videos[0].duration, Some(300));
    }

    #[tokio::test]
    async fn test_pipeline_is_lazy() {
        let mut list = MockListApi::new();
        list.expect_list_page()
            .times(1)
            .returning(|_, _| Ok(page(0, 50, Some("page-2"))));

        let mut lookup = MockDetailApi::new();
        lookup.expect_get_details().never();

        let extractor = Extractor::new(
            Box::new(PlaylistSource::new(Arc::new(list), "PL-test")),
            VideoFilter::new(Period::All, true, Arc::new(lookup)),
        );

        let first: Vec<Result<VideoRecord>> = extractor.videos().take(3).collect().await;
        let ids: Vec<String> = first.into_iter().map(|r| r.unwrap().id).collect();

        assert_eq!(ids, ["vid-0", "vid-1", "vid-2"]);
    }
}
