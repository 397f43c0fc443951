use futures_util::stream::BoxStream;
use std::sync::Arc;

use super::{paginate, ListApi, VideoRecord, VideoSource};
use crate::Result;

/// Every video uploaded to a channel, newest first
pub struct ChannelSource {
    api: Arc<dyn ListApi>,
    channel_id: String,
}

impl ChannelSource {
    /// `api` must list a channel's uploads ordered by publish date, newest first
    pub fn new(api: Arc<dyn ListApi>, channel_id: impl Into<String>) -> Self {
        Self {
            api,
            channel_id: channel_id.into(),
        }
    }
}

impl VideoSource for ChannelSource {
    fn stream(&self) -> BoxStream<'_, Result<VideoRecord>> {
        tracing::info!("Listing videos of channel {}", self.channel_id);
        paginate(self.api.as_ref(), &self.channel_id)
    }

    fn success_message(&self) -> &'static str {
        "Woohoo! We've gone full ninja on this channel - every transcript is now our prisoner!"
    }

    fn sorting_note(&self) -> &'static str {
        "The videos in the doc are sorted from newest to oldest publication date."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::tests::page;
    use crate::extractors::MockListApi;
    use futures_util::TryStreamExt;

    #[tokio::test]
    async fn test_stream_restarts_from_first_page() {
        let mut api = MockListApi::new();
        api.expect_list_page()
            .times(2)
            .returning(|_, token| {
                assert!(token.is_none(), "a new walk must not resume from a cursor");
                Ok(page(0, 2, None))
            });

        let source = ChannelSource::new(Arc::new(api), "UC-test");

        let first: Vec<VideoRecord> = source.stream().try_collect().await.unwrap();
        let second: Vec<VideoRecord> = source.stream().try_collect().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
