//! Trailing-window medians and per-video relative deviations.

use chrono::NaiveDateTime;
use dash_core::models::{BaselineDeviation, HeadlineMetric, Metric, MetricVector, VideoRecord};
use dash_core::percentile::median;
use dash_core::time_utils::months_before;
use tracing::debug;

/// Length of the comparison baseline.
pub const BASELINE_MONTHS: u32 = 12;
/// Length of the "recent" window in the headline tiles.
pub const RECENT_MONTHS: u32 = 6;

// ── BaselineComparator ────────────────────────────────────────────────────────

/// Compares each video against the median video of a trailing window that
/// ends at the most recent publish time in the table.
pub struct BaselineComparator;

impl BaselineComparator {
    /// Most recent publish time minus `months` calendar months.
    ///
    /// `None` for an empty table.
    pub fn window_start(videos: &[VideoRecord], months: u32) -> Option<NaiveDateTime> {
        videos
            .iter()
            .map(|v| v.publish_time)
            .max()
            .map(|latest| months_before(latest, months))
    }

    /// Videos published at or after the start of the trailing window.
    pub fn trailing_window(videos: &[VideoRecord], months: u32) -> Vec<&VideoRecord> {
        let Some(start) = Self::window_start(videos, months) else {
            return Vec::new();
        };
        videos.iter().filter(|v| v.publish_time >= start).collect()
    }

    /// Median of every metric over `videos`, ignoring NaN cells.
    pub fn medians(videos: &[&VideoRecord]) -> MetricVector {
        MetricVector::from_fn(|metric| median(videos.iter().map(|v| v.metric(metric))))
    }

    /// Medians over the trailing 12-month window.
    pub fn baseline(videos: &[VideoRecord]) -> MetricVector {
        let window = Self::trailing_window(videos, BASELINE_MONTHS);
        debug!(
            "Baseline window holds {} of {} videos",
            window.len(),
            videos.len()
        );
        Self::medians(&window)
    }

    /// `(value - median) / median` for every metric of every video.
    ///
    /// Identity columns pass through; row order is preserved.
    pub fn deviations(videos: &[VideoRecord], baseline: &MetricVector) -> Vec<BaselineDeviation> {
        videos
            .iter()
            .map(|video| BaselineDeviation {
                video_id: video.video_id.clone(),
                title: video.title.clone(),
                publish_time: video.publish_time,
                deviations: MetricVector::from_fn(|m| {
                    (video.metric(m) - baseline[m]) / baseline[m]
                }),
            })
            .collect()
    }

    /// Six-month against twelve-month medians for the headline metrics.
    pub fn headline_deltas(videos: &[VideoRecord]) -> Vec<HeadlineMetric> {
        let recent = Self::medians(&Self::trailing_window(videos, RECENT_MONTHS));
        let year = Self::medians(&Self::trailing_window(videos, BASELINE_MONTHS));

        Metric::HEADLINE
            .iter()
            .map(|&metric| HeadlineMetric {
                metric,
                median_6mo: recent[metric],
                median_12mo: year[metric],
                delta: (recent[metric] - year[metric]) / year[metric],
            })
            .collect()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::video;
    use chrono::{Duration, NaiveDate};

    fn t(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    // ── window ───────────────────────────────────────────────────────────────

    #[test]
    fn test_window_start_empty() {
        assert!(BaselineComparator::window_start(&[], 12).is_none());
        assert!(BaselineComparator::baseline(&[])[Metric::Views].is_nan());
    }

    #[test]
    fn test_trailing_window_is_inclusive() {
        let videos = vec![
            video("a", t(2022, 4, 9), 100.0),
            video("b", t(2021, 4, 9), 200.0),
            video("c", t(2021, 4, 8), 300.0),
        ];
        let window = BaselineComparator::trailing_window(&videos, 12);
        let ids: Vec<&str> = window.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_trailing_window_excludes_one_microsecond_before_start() {
        let latest = t(2022, 4, 9) + Duration::hours(12);
        let start = months_before(latest, 12);
        let videos = vec![
            video("latest", latest, 100.0),
            video("at_start", start, 200.0),
            video("just_before", start - Duration::microseconds(1), 300.0),
        ];
        let window = BaselineComparator::trailing_window(&videos, 12);
        let ids: Vec<&str> = window.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["latest", "at_start"]);
    }

    #[test]
    fn test_window_start_clamps_leap_day() {
        let videos = vec![video("a", t(2024, 2, 29), 1.0)];
        assert_eq!(
            BaselineComparator::window_start(&videos, 12),
            Some(t(2023, 2, 28))
        );
    }

    // ── baseline / deviations ────────────────────────────────────────────────

    #[test]
    fn test_oldest_video_excluded_from_baseline() {
        // Three videos spanning 13 months: the oldest must not move the median.
        let videos = vec![
            video("new", t(2022, 6, 1), 100.0),
            video("mid", t(2022, 1, 1), 300.0),
            video("old", t(2021, 5, 1), 1_000_000.0),
        ];
        let baseline = BaselineComparator::baseline(&videos);
        assert_eq!(baseline[Metric::Views], 200.0);

        let devs = BaselineComparator::deviations(&videos, &baseline);
        assert_eq!(devs.len(), 3);
        assert_eq!(devs[0].deviations[Metric::Views], -0.5);
        assert_eq!(devs[1].deviations[Metric::Views], 0.5);
        assert_eq!(devs[2].video_id.as_str(), "old");
    }

    #[test]
    fn test_deviation_at_median_is_zero() {
        let videos = vec![
            video("a", t(2022, 1, 1), 100.0),
            video("b", t(2022, 1, 2), 200.0),
            video("c", t(2022, 1, 3), 300.0),
        ];
        let baseline = BaselineComparator::baseline(&videos);
        let devs = BaselineComparator::deviations(&videos, &baseline);
        assert_eq!(devs[1].deviations[Metric::Views], 0.0);
    }

    #[test]
    fn test_deviation_reconstructs_value_for_every_metric() {
        let mut videos = vec![
            video("a", t(2022, 3, 1), 1_000.0),
            video("b", t(2022, 2, 1), 2_500.0),
            video("c", t(2022, 1, 1), 400.0),
            video("d", t(2021, 12, 1), 7_300.0),
        ];
        for (i, v) in videos.iter_mut().enumerate() {
            let k = (i + 1) as f64;
            v.likes = 40.0 * k;
            v.shares = 3.0 + k;
            v.rpm_usd = 1.5 * k;
            v.impressions = 10_000.0 / k;
            v.subscribers_gained = 5.0 * k;
            *v = dash_core::metrics::DerivedMetrics::enrich(v.clone());
        }
        let baseline = BaselineComparator::baseline(&videos);
        let devs = BaselineComparator::deviations(&videos, &baseline);

        for (video, dev) in videos.iter().zip(&devs) {
            for metric in Metric::ALL {
                let median = baseline[metric];
                let value = video.metric(metric);
                if median == 0.0 || !median.is_finite() || !value.is_finite() {
                    continue;
                }
                let rebuilt = dev.deviations[metric] * median + median;
                assert!(
                    (rebuilt - value).abs() <= 1e-9 * value.abs().max(1.0),
                    "{metric}: {rebuilt} != {value}"
                );
            }
        }
    }

    #[test]
    fn test_baseline_ignores_nan_cells() {
        let mut a = video("a", t(2022, 1, 1), 100.0);
        a.rpm_usd = f64::NAN;
        let mut b = video("b", t(2022, 1, 2), 100.0);
        b.rpm_usd = 2.0;
        let baseline = BaselineComparator::baseline(&[a, b]);
        assert_eq!(baseline[Metric::RpmUsd], 2.0);
    }

    #[test]
    fn test_zero_median_is_not_guarded() {
        let mut a = video("a", t(2022, 1, 1), 100.0);
        a.dislikes = 0.0;
        let mut b = video("b", t(2022, 1, 2), 100.0);
        b.dislikes = 3.0;
        let mut c = video("c", t(2022, 1, 3), 100.0);
        c.dislikes = 0.0;
        let videos = vec![a, b, c];
        let baseline = BaselineComparator::baseline(&videos);
        let devs = BaselineComparator::deviations(&videos, &baseline);
        assert!(devs[0].deviations[Metric::Dislikes].is_nan());
        assert_eq!(devs[1].deviations[Metric::Dislikes], f64::INFINITY);
    }

    // ── headline ─────────────────────────────────────────────────────────────

    #[test]
    fn test_headline_deltas() {
        let videos = vec![
            video("a", t(2022, 12, 1), 300.0),
            video("b", t(2022, 3, 1), 100.0),
        ];
        let headline = BaselineComparator::headline_deltas(&videos);
        assert_eq!(headline.len(), Metric::HEADLINE.len());

        let views = headline
            .iter()
            .find(|h| h.metric == Metric::Views)
            .unwrap();
        assert_eq!(views.median_6mo, 300.0);
        assert_eq!(views.median_12mo, 200.0);
        assert_eq!(views.delta, 0.5);
    }
}
