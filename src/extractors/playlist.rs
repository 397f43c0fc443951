use futures_util::stream::BoxStream;
use std::sync::Arc;

use super::{paginate, ListApi, VideoRecord, VideoSource};
use crate::Result;

/// Every playable entry of a playlist, in playlist order
pub struct PlaylistSource {
    api: Arc<dyn ListApi>,
    playlist_id: String,
}

impl PlaylistSource {
    pub fn new(api: Arc<dyn ListApi>, playlist_id: impl Into<String>) -> Self {
        Self {
            api,
            playlist_id: playlist_id.into(),
        }
    }
}

impl VideoSource for PlaylistSource {
    fn stream(&self) -> BoxStream<'_, Result<VideoRecord>> {
        tracing::info!("Listing videos of playlist {}", self.playlist_id);
        paginate(self.api.as_ref(), &self.playlist_id)
    }

    fn success_message(&self) -> &'static str {
        "Playlist transcript heist complete! We've stolen more words than a literary bandit!"
    }

    fn sorting_note(&self) -> &'static str {
        "The videos in the doc follow the order of the playlist."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::tests::page;
    use crate::extractors::MockListApi;
    use futures_util::TryStreamExt;

    #[tokio::test]
    async fn test_entry_without_video_is_skipped() {
        let mut api = MockListApi::new();
        api.expect_list_page().times(1).returning(|_, _| {
            let mut page = page(0, 107, None);
            page.items[40].video_id = None;
            Ok(page)
        });

        let source = PlaylistSource::new(Arc::new(api), "PL-test");
        let records: Vec<VideoRecord> = source.stream().try_collect().await.unwrap();

        assert_eq!(records.len(), 106);
        assert!(records.iter().all(|r| r.id != "vid-40"));
        assert_eq!(records[40].id, "vid-41");
    }
}
