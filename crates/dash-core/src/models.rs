use chrono::{NaiveDateTime, NaiveTime};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Index, IndexMut};

// ── VideoId ───────────────────────────────────────────────────────────────────

/// Validated external video identifier used as the key of every join.
///
/// Always non-empty and free of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Trim `raw` and wrap it; `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Metric ────────────────────────────────────────────────────────────────────

/// Every numeric column of a [`VideoRecord`].
///
/// Transforms that apply "to all numeric columns" iterate [`Metric::ALL`], so
/// a new variant participates in the baseline comparison automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CommentsAdded,
    Shares,
    Dislikes,
    Likes,
    SubscribersLost,
    SubscribersGained,
    RpmUsd,
    CpmUsd,
    AveragePercentViewed,
    Views,
    WatchTimeHours,
    Subscribers,
    EstimatedRevenueUsd,
    Impressions,
    ImpressionsCtr,
    AvgDurationSec,
    EngagementRatio,
    ViewsPerSubGained,
}

impl Metric {
    pub const COUNT: usize = 18;

    /// All metrics in source-column order, derived metrics last.
    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::CommentsAdded,
        Metric::Shares,
        Metric::Dislikes,
        Metric::Likes,
        Metric::SubscribersLost,
        Metric::SubscribersGained,
        Metric::RpmUsd,
        Metric::CpmUsd,
        Metric::AveragePercentViewed,
        Metric::Views,
        Metric::WatchTimeHours,
        Metric::Subscribers,
        Metric::EstimatedRevenueUsd,
        Metric::Impressions,
        Metric::ImpressionsCtr,
        Metric::AvgDurationSec,
        Metric::EngagementRatio,
        Metric::ViewsPerSubGained,
    ];

    /// Metrics shown in the headline tiles and the deviation table.
    pub const HEADLINE: [Metric; 10] = [
        Metric::Views,
        Metric::Likes,
        Metric::Subscribers,
        Metric::Shares,
        Metric::CommentsAdded,
        Metric::RpmUsd,
        Metric::AveragePercentViewed,
        Metric::AvgDurationSec,
        Metric::EngagementRatio,
        Metric::ViewsPerSubGained,
    ];

    /// Canonical column name.
    pub fn label(self) -> &'static str {
        match self {
            Metric::CommentsAdded => "Comments added",
            Metric::Shares => "Shares",
            Metric::Dislikes => "Dislikes",
            Metric::Likes => "Likes",
            Metric::SubscribersLost => "Subscribers lost",
            Metric::SubscribersGained => "Subscribers gained",
            Metric::RpmUsd => "RPM(USD)",
            Metric::CpmUsd => "CPM(USD)",
            Metric::AveragePercentViewed => "Average % viewed",
            Metric::Views => "Views",
            Metric::WatchTimeHours => "Watch time (hours)",
            Metric::Subscribers => "Subscribers",
            Metric::EstimatedRevenueUsd => "Your estimated revenue (USD)",
            Metric::Impressions => "Impressions",
            Metric::ImpressionsCtr => "Impressions ctr(%)",
            Metric::AvgDurationSec => "Avg_duration_sec",
            Metric::EngagementRatio => "Engagement_ratio",
            Metric::ViewsPerSubGained => "Views / sub gained",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── MetricVector ──────────────────────────────────────────────────────────────

/// One `f64` per [`Metric`], indexable by metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricVector([f64; Metric::COUNT]);

impl MetricVector {
    /// Every slot set to `value`.
    pub fn filled(value: f64) -> Self {
        Self([value; Metric::COUNT])
    }

    /// Build a vector by evaluating `f` for each metric.
    pub fn from_fn(mut f: impl FnMut(Metric) -> f64) -> Self {
        let mut out = Self::filled(f64::NAN);
        for metric in Metric::ALL {
            out[metric] = f(metric);
        }
        out
    }

    /// `(metric, value)` pairs in [`Metric::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.iter().map(move |&m| (m, self[m]))
    }
}

impl Index<Metric> for MetricVector {
    type Output = f64;

    fn index(&self, metric: Metric) -> &f64 {
        &self.0[metric.slot()]
    }
}

impl IndexMut<Metric> for MetricVector {
    fn index_mut(&mut self, metric: Metric) -> &mut f64 {
        &mut self.0[metric.slot()]
    }
}

impl Serialize for MetricVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Metric::COUNT))?;
        for (metric, value) in self.iter() {
            map.serialize_entry(metric.label(), &value)?;
        }
        map.end()
    }
}

// ── VideoRecord ───────────────────────────────────────────────────────────────

/// One row of the per-video aggregate export.
///
/// Counters are kept as `f64` because empty cells load as NaN and every
/// metric feeds the same median/deviation arithmetic.
#[derive(Debug, Clone, Serialize)]
pub struct VideoRecord {
    pub video_id: VideoId,
    pub title: String,
    pub publish_time: NaiveDateTime,
    pub comments_added: f64,
    pub shares: f64,
    pub dislikes: f64,
    pub likes: f64,
    pub subscribers_lost: f64,
    pub subscribers_gained: f64,
    pub rpm_usd: f64,
    pub cpm_usd: f64,
    pub average_percent_viewed: f64,
    /// Parsed `HH:MM:SS` average view duration.
    pub average_view_duration: NaiveTime,
    pub views: f64,
    pub watch_time_hours: f64,
    pub subscribers: f64,
    pub estimated_revenue_usd: f64,
    pub impressions: f64,
    pub impressions_ctr: f64,
    /// Derived; NaN until enriched.
    pub avg_duration_sec: f64,
    /// Derived; NaN until enriched, ∞/NaN when views is zero.
    pub engagement_ratio: f64,
    /// Derived; NaN until enriched, ∞/NaN when no subscribers were gained.
    pub views_per_sub_gained: f64,
}

impl VideoRecord {
    /// Read a single metric.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::CommentsAdded => self.comments_added,
            Metric::Shares => self.shares,
            Metric::Dislikes => self.dislikes,
            Metric::Likes => self.likes,
            Metric::SubscribersLost => self.subscribers_lost,
            Metric::SubscribersGained => self.subscribers_gained,
            Metric::RpmUsd => self.rpm_usd,
            Metric::CpmUsd => self.cpm_usd,
            Metric::AveragePercentViewed => self.average_percent_viewed,
            Metric::Views => self.views,
            Metric::WatchTimeHours => self.watch_time_hours,
            Metric::Subscribers => self.subscribers,
            Metric::EstimatedRevenueUsd => self.estimated_revenue_usd,
            Metric::Impressions => self.impressions,
            Metric::ImpressionsCtr => self.impressions_ctr,
            Metric::AvgDurationSec => self.avg_duration_sec,
            Metric::EngagementRatio => self.engagement_ratio,
            Metric::ViewsPerSubGained => self.views_per_sub_gained,
        }
    }

    /// All metrics as a typed vector.
    pub fn metrics(&self) -> MetricVector {
        MetricVector::from_fn(|m| self.metric(m))
    }
}

// ── Audience ──────────────────────────────────────────────────────────────────

/// Simplified country grouping used in the audience breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AudienceBucket {
    #[serde(rename = "USA")]
    Usa,
    India,
    Other,
}

impl AudienceBucket {
    pub const ALL: [AudienceBucket; 3] =
        [AudienceBucket::Usa, AudienceBucket::India, AudienceBucket::Other];

    pub fn label(self) -> &'static str {
        match self {
            AudienceBucket::Usa => "USA",
            AudienceBucket::India => "India",
            AudienceBucket::Other => "Other",
        }
    }
}

impl fmt::Display for AudienceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a raw country code to its bucket: `US` → USA, `IN` → India, anything
/// else → Other. Matching is exact.
pub fn audience_bucket(country_code: &str) -> AudienceBucket {
    match country_code {
        "US" => AudienceBucket::Usa,
        "IN" => AudienceBucket::India,
        _ => AudienceBucket::Other,
    }
}

/// One row of the country / subscriber-status export.
#[derive(Debug, Clone, Serialize)]
pub struct CountrySubscriptionRecord {
    /// Joins to [`VideoRecord::title`]; titles are not guaranteed unique.
    pub video_title: String,
    pub country_code: String,
    pub is_subscribed: bool,
    pub views: f64,
}

impl CountrySubscriptionRecord {
    pub fn audience_bucket(&self) -> AudienceBucket {
        audience_bucket(&self.country_code)
    }
}

// ── Daily series ──────────────────────────────────────────────────────────────

/// One row of the per-video, per-day export.
#[derive(Debug, Clone, Serialize)]
pub struct DailyPerformanceRecord {
    pub video_id: VideoId,
    pub video_title: String,
    pub date: NaiveDateTime,
    pub views: f64,
}

/// A daily row that resolved to its video's publish time.
#[derive(Debug, Clone, Serialize)]
pub struct JoinedDailyRecord {
    pub video_id: VideoId,
    pub video_title: String,
    pub date: NaiveDateTime,
    pub views: f64,
    pub publish_time: NaiveDateTime,
    /// Whole days between publish time and `date`, floored.
    pub days_published: i64,
}

// ── Derived outputs ───────────────────────────────────────────────────────────

/// A video's metrics expressed as fractional deviation from the baseline.
#[derive(Debug, Clone, Serialize)]
pub struct BaselineDeviation {
    pub video_id: VideoId,
    pub title: String,
    pub publish_time: NaiveDateTime,
    /// `(value - median) / median` per metric.
    pub deviations: MetricVector,
}

/// Daily-view distribution for one days-since-publish offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileBand {
    pub days_published: i64,
    pub mean_views: f64,
    pub median_views: f64,
    pub p80_views: f64,
    pub p20_views: f64,
}

/// Running totals of the percentile bands up to `days_published`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CumulativeBand {
    pub days_published: i64,
    pub median_views: f64,
    pub p80_views: f64,
    pub p20_views: f64,
}

/// One point of a single video's cumulative view curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    pub days_published: i64,
    pub cumulative_views: f64,
}

/// Recent-vs-year comparison shown in the headline tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadlineMetric {
    pub metric: Metric,
    pub median_6mo: f64,
    pub median_12mo: f64,
    /// `(median_6mo - median_12mo) / median_12mo`.
    pub delta: f64,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
