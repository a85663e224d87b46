//! Days-since-publish alignment of the daily series and the 20/50/80
//! percentile bands of the first month.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use dash_core::models::{
    CumulativeBand, DailyPerformanceRecord, JoinedDailyRecord, PercentileBand, TrajectoryPoint,
    VideoId, VideoRecord,
};
use dash_core::percentile::{mean, percentile, sorted_observations};
use dash_core::time_utils::days_between;
use tracing::debug;

use crate::baseline::{BaselineComparator, BASELINE_MONTHS};

/// Last days-since-publish offset covered by the bands.
pub const MAX_DAYS_PUBLISHED: i64 = 30;

// ── Join ──────────────────────────────────────────────────────────────────────

/// Attach each daily row to its video's publish time.
///
/// Rows whose id has no video are dropped.
pub fn join_publish_dates(
    daily: &[DailyPerformanceRecord],
    videos: &[VideoRecord],
) -> Vec<JoinedDailyRecord> {
    let publish_times: HashMap<&VideoId, NaiveDateTime> = videos
        .iter()
        .map(|v| (&v.video_id, v.publish_time))
        .collect();

    let joined: Vec<JoinedDailyRecord> = daily
        .iter()
        .filter_map(|row| {
            let publish_time = *publish_times.get(&row.video_id)?;
            Some(JoinedDailyRecord {
                video_id: row.video_id.clone(),
                video_title: row.video_title.clone(),
                date: row.date,
                views: row.views,
                publish_time,
                days_published: days_between(row.date, publish_time),
            })
        })
        .collect();

    let dropped = daily.len() - joined.len();
    if dropped > 0 {
        debug!("Dropped {} daily rows with no matching video", dropped);
    }
    joined
}

// ── PercentileModel ───────────────────────────────────────────────────────────

/// Distribution of daily views by days since publish, over the videos of
/// the trailing baseline window.
pub struct PercentileModel;

impl PercentileModel {
    /// Joined rows whose video was published inside the trailing 12 months.
    pub fn cohort<'a>(
        joined: &'a [JoinedDailyRecord],
        videos: &[VideoRecord],
    ) -> Vec<&'a JoinedDailyRecord> {
        let Some(start) = BaselineComparator::window_start(videos, BASELINE_MONTHS) else {
            return Vec::new();
        };
        joined.iter().filter(|r| r.publish_time >= start).collect()
    }

    /// Mean, median, 80th and 20th percentile of daily views for every offset
    /// in `0..=30` that has at least one observation. Missing offsets are
    /// absent, not filled.
    pub fn bands(rows: &[&JoinedDailyRecord]) -> Vec<PercentileBand> {
        let mut by_offset: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
        for row in rows {
            if (0..=MAX_DAYS_PUBLISHED).contains(&row.days_published) {
                by_offset.entry(row.days_published).or_default().push(row.views);
            }
        }

        by_offset
            .into_iter()
            .filter_map(|(days_published, views)| {
                let sorted = sorted_observations(views);
                if sorted.is_empty() {
                    return None;
                }
                Some(PercentileBand {
                    days_published,
                    mean_views: mean(sorted.iter().copied()),
                    median_views: percentile(&sorted, 50.0),
                    p80_views: percentile(&sorted, 80.0),
                    p20_views: percentile(&sorted, 20.0),
                })
            })
            .collect()
    }

    /// Running sums of the median, 80th and 20th percentile bands.
    pub fn cumulative_bands(bands: &[PercentileBand]) -> Vec<CumulativeBand> {
        bands
            .iter()
            .scan((0.0, 0.0, 0.0), |(median, p80, p20), band| {
                *median += band.median_views;
                *p80 += band.p80_views;
                *p20 += band.p20_views;
                Some(CumulativeBand {
                    days_published: band.days_published,
                    median_views: *median,
                    p80_views: *p80,
                    p20_views: *p20,
                })
            })
            .collect()
    }
}

/// Cumulative views of one video over its first 30 days, ordered by offset.
pub fn video_trajectory(joined: &[JoinedDailyRecord], video_id: &VideoId) -> Vec<TrajectoryPoint> {
    let mut rows: Vec<&JoinedDailyRecord> = joined
        .iter()
        .filter(|r| &r.video_id == video_id)
        .filter(|r| (0..=MAX_DAYS_PUBLISHED).contains(&r.days_published))
        .filter(|r| !r.views.is_nan())
        .collect();
    rows.sort_by_key(|r| r.days_published);

    let mut total = 0.0;
    rows.into_iter()
        .map(|r| {
            total += r.views;
            TrajectoryPoint {
                days_published: r.days_published,
                cumulative_views: total,
            }
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
