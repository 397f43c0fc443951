use std::sync::Arc;

pub mod period;

pub use period::Period;

use crate::extractors::{DetailApi, VideoRecord};

/// Videos at or below this length count as shorts
pub const MAX_SHORT_DURATION_SECONDS: u64 = 60;

/// Check whether a duration qualifies as a YouTube short
pub fn is_short(duration_seconds: u64) -> bool {
    duration_seconds <= MAX_SHORT_DURATION_SECONDS
}

/// Decides which discovered videos are kept.
///
/// The period check runs first and needs nothing but the record itself. Durations are only
/// looked up when shorts must be excluded and the video is inside the period.
pub struct VideoFilter {
    period: Period,
    include_shorts: bool,
    details: Arc<dyn DetailApi>,
}

impl VideoFilter {
    pub fn new(period: Period, include_shorts: bool, details: Arc<dyn DetailApi>) -> Self {
        Self {
            period,
            include_shorts,
            details,
        }
    }

    /// Decide whether to keep a video, storing its duration on the record when it was fetched
    pub async fn accept(&self, record: &mut VideoRecord) -> bool {
        if !self.period.matches(record.published_at.as_deref()) {
            tracing::debug!(video_id = %record.id, period = %self.period, "Outside survey period");
            return false;
        }

        if self.include_shorts {
            return true;
        }

        let details = match self.details.get_details(&record.id).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                tracing::warn!(
                    "Could not get details for video '{}'. Skipping.",
                    record.display_title()
                );
                return false;
            }
            Err(e) => {
                tracing::warn!(
                    "Could not get details for video '{}': {:#}. Skipping.",
                    record.display_title(),
                    e
                );
                return false;
            }
        };

        record.duration = Some(details.duration_seconds);

        if is_short(details.duration_seconds) {
            tracing::debug!(
                video_id = %record.id,
                duration = details.duration_seconds,
                "Skipping short"
            );
            return false;
        }

        true
    }
}
