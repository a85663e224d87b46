//! Main analysis pipeline for Channel Dash.
//!
//! Runs ingestion, the baseline comparison and the percentile model once,
//! returning a [`ChannelAnalysis`] that every view reads from.

use std::path::Path;

use dash_core::models::{
    BaselineDeviation, CumulativeBand, HeadlineMetric, JoinedDailyRecord, MetricVector,
    PercentileBand,
};
use dash_core::time_utils::TimezoneHandler;
use dash_core::Result;
use serde::Serialize;
use tracing::info;

use crate::baseline::BaselineComparator;
use crate::reader::{ingest, ChannelData};
use crate::trajectory::{join_publish_dates, PercentileModel};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Videos in the per-video table after dropping the Total row.
    pub videos_loaded: usize,
    /// Videos inside the trailing 12-month baseline window.
    pub videos_in_baseline: usize,
    /// Daily rows that resolved to a video.
    pub daily_rows_joined: usize,
    /// Wall-clock seconds spent reading the CSV files.
    pub load_time_seconds: f64,
}

/// The complete output of [`analyze_channel`].
#[derive(Debug, Clone)]
pub struct ChannelAnalysis {
    pub data: ChannelData,
    /// Trailing-12-month median of every metric.
    pub baseline: MetricVector,
    /// One row per video, publish-descending.
    pub deviations: Vec<BaselineDeviation>,
    /// Six- vs twelve-month medians of the headline metrics.
    pub headline: Vec<HeadlineMetric>,
    /// Every daily row that joined to a video, regardless of window.
    pub joined_daily: Vec<JoinedDailyRecord>,
    /// Percentile bands of the trailing-12-month cohort.
    pub bands: Vec<PercentileBand>,
    pub cumulative_bands: Vec<CumulativeBand>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Load the exports in `data_dir` and run the full pipeline.
pub fn analyze_channel(data_dir: &Path, tz: &TimezoneHandler) -> Result<ChannelAnalysis> {
    let load_start = std::time::Instant::now();
    let data = ingest(data_dir, tz)?;
    let load_time_seconds = load_start.elapsed().as_secs_f64();

    let analysis = analyze(data, load_time_seconds);
    info!(
        "Analysed {} videos ({} in baseline), {} daily rows in {:.3}s",
        analysis.metadata.videos_loaded,
        analysis.metadata.videos_in_baseline,
        analysis.metadata.daily_rows_joined,
        analysis.metadata.load_time_seconds,
    );
    Ok(analysis)
}

/// Run the comparison and percentile stages over already-loaded tables.
pub fn analyze(data: ChannelData, load_time_seconds: f64) -> ChannelAnalysis {
    let baseline = BaselineComparator::baseline(&data.videos);
    let deviations = BaselineComparator::deviations(&data.videos, &baseline);
    let headline = BaselineComparator::headline_deltas(&data.videos);

    let joined_daily = join_publish_dates(&data.daily_performance, &data.videos);
    let bands = PercentileModel::bands(&PercentileModel::cohort(&joined_daily, &data.videos));
    let cumulative_bands = PercentileModel::cumulative_bands(&bands);

    let metadata = AnalysisMetadata {
        generated_at: chrono::Utc::now().to_rfc3339(),
        videos_loaded: data.videos.len(),
        videos_in_baseline: BaselineComparator::trailing_window(
            &data.videos,
            crate::baseline::BASELINE_MONTHS,
        )
        .len(),
        daily_rows_joined: joined_daily.len(),
        load_time_seconds,
    };

    ChannelAnalysis {
        data,
        baseline,
        deviations,
        headline,
        joined_daily,
        bands,
        cumulative_bands,
        metadata,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{COUNTRY_SUBSCRIPTION_FILE, DAILY_PERFORMANCE_FILE};
    use crate::test_support::{video_row, write_file, write_video_file};
    use dash_core::models::Metric;
    use tempfile::TempDir;

    fn write_channel(dir: &Path) {
        write_video_file(
            dir,
            &[
                video_row("A", "Alpha", "2022-06-01", 100, 10),
                video_row("B", "Beta", "2022-01-01", 300, 30),
                video_row("C", "Gamma", "2021-05-01", 1000000, 100),
            ],
        );
        write_file(
            dir,
            COUNTRY_SUBSCRIPTION_FILE,
            &["Video Title,Country Code,Is Subscribed,Views", "Alpha,US,True,60"],
        );
        write_file(
            dir,
            DAILY_PERFORMANCE_FILE,
            &[
                "Date,Video Title,External Video ID,Views",
                "2022-06-01,Alpha,A,10",
                "2022-06-02,Alpha,A,20",
                "2022-01-01,Beta,B,30",
                "2022-01-02,Beta,B,40",
                "2021-05-01,Gamma,C,5000",
                "2022-01-05,Ghost,Z,7",
            ],
        );
    }

    #[test]
    fn test_analyze_channel_end_to_end() {
        let tmp = TempDir::new().unwrap();
        write_channel(tmp.path());

        let analysis = analyze_channel(tmp.path(), &TimezoneHandler::default()).unwrap();

        assert_eq!(analysis.metadata.videos_loaded, 3);
        assert_eq!(analysis.metadata.videos_in_baseline, 2);
        // The unmatched "Z" row is dropped.
        assert_eq!(analysis.metadata.daily_rows_joined, 5);

        assert_eq!(analysis.baseline[Metric::Views], 200.0);
        assert_eq!(analysis.deviations.len(), 3);
        assert_eq!(analysis.deviations[0].title, "Alpha");
        assert_eq!(analysis.deviations[0].deviations[Metric::Views], -0.5);

        // C is outside the window, so its 5000-view day never reaches the bands.
        let offsets: Vec<i64> = analysis.bands.iter().map(|b| b.days_published).collect();
        assert_eq!(offsets, vec![0, 1]);
        assert_eq!(analysis.bands[0].median_views, 20.0);
        assert_eq!(analysis.cumulative_bands[1].median_views, 50.0);

        assert_eq!(analysis.headline.len(), Metric::HEADLINE.len());
    }

    fn write_march_channel(dir: &Path) {
        write_video_file(dir, &[video_row("A", "Alpha", "\"Mar 1, 2022\"", 100, 10)]);
        write_file(
            dir,
            COUNTRY_SUBSCRIPTION_FILE,
            &["Video Title,Country Code,Is Subscribed,Views"],
        );
        write_file(
            dir,
            DAILY_PERFORMANCE_FILE,
            &[
                "Date,Video Title,External Video ID,Views",
                "1 Mar 2022,Alpha,A,10",
                "15 Mar 2022,Alpha,A,20",
            ],
        );
    }

    #[test]
    fn test_day_offsets_survive_dst_change() {
        let tmp = TempDir::new().unwrap();
        write_march_channel(tmp.path());

        // New York springs forward on 13 March 2022.
        let analysis =
            analyze_channel(tmp.path(), &TimezoneHandler::new("America/New_York")).unwrap();

        let offsets: Vec<i64> = analysis.joined_daily.iter().map(|r| r.days_published).collect();
        assert_eq!(offsets, vec![0, 14]);
    }

    #[test]
    fn test_publish_date_is_the_exported_date_east_of_utc() {
        let tmp = TempDir::new().unwrap();
        write_march_channel(tmp.path());

        let analysis = analyze_channel(tmp.path(), &TimezoneHandler::new("Asia/Kolkata")).unwrap();
        let row = crate::presentation::DeviationRow::from(&analysis.deviations[0]);
        assert_eq!(row.publish_date.to_string(), "2022-03-01");
    }

    #[test]
    fn test_analyze_channel_propagates_ingest_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(analyze_channel(tmp.path(), &TimezoneHandler::default()).is_err());
    }
}
