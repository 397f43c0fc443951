use std::sync::Arc;

use super::{DetailApi, VideoRecord};
use crate::youtube::video_id_from_url;
use crate::{Result, ScribeError};

/// Resolves single video URLs into records
pub struct SingleVideoExtractor {
    details: Arc<dyn DetailApi>,
}

impl SingleVideoExtractor {
    pub fn new(details: Arc<dyn DetailApi>) -> Self {
        Self { details }
    }

    /// Look up the video behind a URL. `Ok(None)` means the video is private or gone.
    pub async fn get_video(&self, url: &str) -> Result<Option<VideoRecord>> {
        let video_id = video_id_from_url(url)
            .ok_or_else(|| ScribeError::InvalidUrl(format!("no video id in {}", url)))?;

        tracing::debug!("Resolved {} to video id {}", url, video_id);

        let details = self.details.get_details(&video_id).await?;
        Ok(details.map(VideoRecord::from))
    }
}
