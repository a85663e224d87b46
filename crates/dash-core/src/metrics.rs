use chrono::{NaiveTime, Timelike};

use crate::models::VideoRecord;

// ── DerivedMetrics ────────────────────────────────────────────────────────────

/// Stateless per-video feature engineering.
///
/// Zero denominators are not special-cased: the ratios come out as ∞ or NaN
/// and flow through unchanged.
pub struct DerivedMetrics;

impl DerivedMetrics {
    /// `hours * 3600 + minutes * 60 + seconds`.
    pub fn avg_duration_sec(duration: NaiveTime) -> f64 {
        f64::from(duration.hour() * 3600 + duration.minute() * 60 + duration.second())
    }

    /// `(comments + shares + dislikes + likes) / views`.
    pub fn engagement_ratio(video: &VideoRecord) -> f64 {
        (video.comments_added + video.shares + video.dislikes + video.likes) / video.views
    }

    /// `views / subscribers gained`.
    pub fn views_per_sub_gained(video: &VideoRecord) -> f64 {
        video.views / video.subscribers_gained
    }

    /// Return `video` with its three derived fields populated.
    pub fn enrich(video: VideoRecord) -> VideoRecord {
        let avg_duration_sec = Self::avg_duration_sec(video.average_view_duration);
        let engagement_ratio = Self::engagement_ratio(&video);
        let views_per_sub_gained = Self::views_per_sub_gained(&video);
        VideoRecord {
            avg_duration_sec,
            engagement_ratio,
            views_per_sub_gained,
            ..video
        }
    }

    /// Enrich every video and order the table most-recent first.
    pub fn enrich_all(videos: Vec<VideoRecord>) -> Vec<VideoRecord> {
        let mut enriched: Vec<VideoRecord> = videos.into_iter().map(Self::enrich).collect();
        sort_by_publish_desc(&mut enriched);
        enriched
    }
}

/// Stable sort by publish time, newest first; equal times keep input order.
pub fn sort_by_publish_desc(videos: &mut [VideoRecord]) {
    videos.sort_by(|a, b| b.publish_time.cmp(&a.publish_time));
}

// ── Tests ─────────────────────────────────────────────────────────────────────
