//! View models handed to the terminal UI and the JSON output.
//!
//! Nothing here computes statistics; it only selects, formats and colours
//! values already produced by the analysis pipeline.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use dash_core::formatting::format_percent;
use dash_core::models::{
    AudienceBucket, BaselineDeviation, CumulativeBand, HeadlineMetric, Metric, PercentileBand,
    TrajectoryPoint, VideoId, VideoRecord,
};
use dash_core::{DashError, Result};
use serde::Serialize;

use crate::analysis::{AnalysisMetadata, ChannelAnalysis};
use crate::trajectory::video_trajectory;

/// Columns of the deviation table, in display order.
pub const DEVIATION_COLUMNS: [Metric; 10] = Metric::HEADLINE;

// ── Styling ───────────────────────────────────────────────────────────────────

/// Colour class of a signed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellTone {
    Negative,
    Positive,
    Neutral,
}

impl CellTone {
    /// NaN and zero are neutral; infinities take their sign.
    pub fn of(value: f64) -> Self {
        if value < 0.0 {
            CellTone::Negative
        } else if value > 0.0 {
            CellTone::Positive
        } else {
            CellTone::Neutral
        }
    }
}

/// One formatted deviation cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledCell {
    pub metric: Metric,
    pub value: f64,
    /// Percentage with one decimal, e.g. `-12.5%`.
    pub text: String,
    pub tone: CellTone,
}

impl StyledCell {
    pub fn deviation(metric: Metric, value: f64) -> Self {
        Self {
            metric,
            value,
            text: format_percent(value, 1),
            tone: CellTone::of(value),
        }
    }
}

/// A row of the deviation table.
#[derive(Debug, Clone, Serialize)]
pub struct DeviationRow {
    pub video_id: VideoId,
    pub title: String,
    pub publish_date: NaiveDate,
    pub cells: Vec<StyledCell>,
}

impl From<&BaselineDeviation> for DeviationRow {
    fn from(dev: &BaselineDeviation) -> Self {
        Self {
            video_id: dev.video_id.clone(),
            title: dev.title.clone(),
            publish_date: dev.publish_time.date(),
            cells: DEVIATION_COLUMNS
                .iter()
                .map(|&m| StyledCell::deviation(m, dev.deviations[m]))
                .collect(),
        }
    }
}

// ── Top-N ranking ─────────────────────────────────────────────────────────────

/// An entry of the engagement leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct RankedVideo {
    /// 1-based position.
    pub rank: usize,
    pub video_id: VideoId,
    pub title: String,
    pub engagement_ratio: f64,
}

/// Coerce user input to a count. Surrounding whitespace is ignored.
pub fn parse_top_n(text: &str) -> Result<usize> {
    text.trim()
        .parse::<usize>()
        .map_err(|_| DashError::InvalidTopN(text.to_string()))
}

/// The `n` videos with the highest engagement ratio.
///
/// Ties keep table order and NaN ratios rank last.
pub fn top_videos_by_engagement(videos: &[VideoRecord], n: usize) -> Vec<RankedVideo> {
    let mut ranked: Vec<&VideoRecord> = videos.iter().collect();
    ranked.sort_by(|a, b| descending_nan_last(a.engagement_ratio, b.engagement_ratio));

    ranked
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, v)| RankedVideo {
            rank: i + 1,
            video_id: v.video_id.clone(),
            title: v.title.clone(),
            engagement_ratio: v.engagement_ratio,
        })
        .collect()
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

// ── Aggregate view ────────────────────────────────────────────────────────────

/// Everything shown in the aggregate dashboard mode.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateView {
    pub headline: Vec<HeadlineMetric>,
    pub rows: Vec<DeviationRow>,
    pub top_n: usize,
    pub top_videos: Vec<RankedVideo>,
}

pub fn aggregate_view(analysis: &ChannelAnalysis, top_n: usize) -> AggregateView {
    AggregateView {
        headline: analysis.headline.clone(),
        rows: analysis.deviations.iter().map(DeviationRow::from).collect(),
        top_n,
        top_videos: top_videos_by_engagement(&analysis.data.videos, top_n),
    }
}

// ── Individual video view ─────────────────────────────────────────────────────

/// Views from one subscription status and audience bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudienceSlice {
    pub is_subscribed: bool,
    pub bucket: AudienceBucket,
    pub views: f64,
}

/// Everything shown for a single selected video.
#[derive(Debug, Clone, Serialize)]
pub struct VideoDetail {
    pub video_id: VideoId,
    pub title: String,
    pub publish_time: NaiveDateTime,
    /// Not-subscribed first, then USA / India / Other. Combinations with no
    /// rows are omitted.
    pub audience: Vec<AudienceSlice>,
    pub trajectory: Vec<TrajectoryPoint>,
    pub bands: Vec<CumulativeBand>,
}

/// Titles in table order, for pickers.
pub fn video_titles(analysis: &ChannelAnalysis) -> Vec<&str> {
    analysis.data.videos.iter().map(|v| v.title.as_str()).collect()
}

/// Build the detail view for the first video titled `title`.
pub fn video_detail(analysis: &ChannelAnalysis, title: &str) -> Result<VideoDetail> {
    let video = analysis
        .data
        .videos
        .iter()
        .find(|v| v.title == title)
        .ok_or_else(|| DashError::UnknownVideo(title.to_string()))?;

    let mut audience = Vec::new();
    for is_subscribed in [false, true] {
        for bucket in AudienceBucket::ALL {
            let rows: Vec<f64> = analysis
                .data
                .country_subscriptions
                .iter()
                .filter(|r| r.video_title == title)
                .filter(|r| r.is_subscribed == is_subscribed && r.audience_bucket() == bucket)
                .map(|r| r.views)
                .collect();
            if rows.is_empty() {
                continue;
            }
            audience.push(AudienceSlice {
                is_subscribed,
                bucket,
                views: rows.into_iter().filter(|v| !v.is_nan()).sum(),
            });
        }
    }

    Ok(VideoDetail {
        video_id: video.video_id.clone(),
        title: video.title.clone(),
        publish_time: video.publish_time,
        audience,
        trajectory: video_trajectory(&analysis.joined_daily, &video.video_id),
        bands: analysis.cumulative_bands.clone(),
    })
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Serialisable bundle printed by `--output json`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub metadata: AnalysisMetadata,
    pub aggregate: AggregateView,
    pub bands: Vec<PercentileBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoDetail>,
}

impl DashboardSnapshot {
    /// Assemble the snapshot; `video_title` adds the detail of that video.
    pub fn build(
        analysis: &ChannelAnalysis,
        top_n: usize,
        video_title: Option<&str>,
    ) -> Result<Self> {
        let video = video_title
            .map(|title| video_detail(analysis, title))
            .transpose()?;
        Ok(Self {
            metadata: analysis.metadata.clone(),
            aggregate: aggregate_view(analysis, top_n),
            bands: analysis.bands.clone(),
            video,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
