//! CSV loading for the three YouTube Studio exports.
//!
//! The per-video file is read positionally (its headers vary between export
//! languages); the country and daily files are read by header name.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use csv::StringRecord;
use dash_core::metrics::DerivedMetrics;
use dash_core::models::{
    CountrySubscriptionRecord, DailyPerformanceRecord, VideoId, VideoRecord,
};
use dash_core::time_utils::{parse_view_duration, TimezoneHandler};
use dash_core::{DashError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

// ── File names ────────────────────────────────────────────────────────────────

pub const VIDEO_METRICS_FILE: &str = "Aggregated_Metrics_By_Video.csv";
pub const COUNTRY_SUBSCRIPTION_FILE: &str =
    "Aggregated_Metrics_By_Country_And_Subscriber_Status.csv";
pub const DAILY_PERFORMANCE_FILE: &str = "Video_Performance_Over_Time.csv";

/// Canonical names of the per-video columns, in file order.
pub const VIDEO_COLUMNS: [&str; 19] = [
    "Video",
    "Video title",
    "Video publish time",
    "Comments added",
    "Shares",
    "Dislikes",
    "Likes",
    "Subscribers lost",
    "Subscribers gained",
    "RPM(USD)",
    "CPM(USD)",
    "Average % viewed",
    "Average view duration",
    "Views",
    "Watch time (hours)",
    "Subscribers",
    "Your estimated revenue (USD)",
    "Impressions",
    "Impressions ctr(%)",
];

const TOTAL_ROW_MARKER: &str = "Total";

// ── Types ─────────────────────────────────────────────────────────────────────

/// The per-video export exactly as it was read, header included.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Every table produced by ingestion, videos already enriched and sorted
/// newest first.
#[derive(Debug, Clone, Default)]
pub struct ChannelData {
    pub videos: Vec<VideoRecord>,
    pub country_subscriptions: Vec<CountrySubscriptionRecord>,
    pub daily_performance: Vec<DailyPerformanceRecord>,
    pub raw_videos: RawTable,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load all three exports from `data_dir` and run the derived-metrics pass.
pub fn ingest(data_dir: &Path, tz: &TimezoneHandler) -> Result<ChannelData> {
    if !data_dir.is_dir() {
        return Err(DashError::DataPathNotFound(data_dir.to_path_buf()));
    }

    let (videos, raw_videos) = load_video_metrics(&data_dir.join(VIDEO_METRICS_FILE), tz)?;
    let country_subscriptions =
        load_country_subscription(&data_dir.join(COUNTRY_SUBSCRIPTION_FILE))?;
    let daily_performance = load_daily_performance(&data_dir.join(DAILY_PERFORMANCE_FILE), tz)?;

    Ok(ChannelData {
        videos: DerivedMetrics::enrich_all(videos),
        country_subscriptions,
        daily_performance,
        raw_videos,
    })
}

/// Read the per-video export.
///
/// The file must have exactly 19 columns. A leading `Total` summary row is
/// dropped. Returns the typed rows in file order alongside the raw table.
pub fn load_video_metrics(
    path: &Path,
    tz: &TimezoneHandler,
) -> Result<(Vec<VideoRecord>, RawTable)> {
    let mut reader = open_csv(path)?;

    let headers = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .clone();
    if headers.len() != VIDEO_COLUMNS.len() {
        return Err(DashError::ColumnCount {
            path: path.to_path_buf(),
            expected: VIDEO_COLUMNS.len(),
            found: headers.len(),
        });
    }

    let mut raw = RawTable {
        headers: headers.iter().map(str::to_string).collect(),
        rows: Vec::new(),
    };
    let mut videos = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| csv_error(path, e))?;
        raw.rows.push(record.iter().map(str::to_string).collect());

        if index == 0 {
            if record.get(0).map(str::trim) == Some(TOTAL_ROW_MARKER) {
                debug!("Dropping summary row from {}", path.display());
                continue;
            }
            warn!(
                "First data row of {} is not a Total row; keeping it",
                path.display()
            );
        }

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 2);
        let Some(video_id) = record.get(0).and_then(VideoId::parse) else {
            warn!("Skipping row {} of {}: no video id", line, path.display());
            continue;
        };
        videos.push(parse_video_row(video_id, &record, line, tz)?);
    }

    debug!("Loaded {} videos from {}", videos.len(), path.display());
    Ok((videos, raw))
}

/// Read the country / subscriber-status export by header name.
pub fn load_country_subscription(path: &Path) -> Result<Vec<CountrySubscriptionRecord>> {
    let mut reader = open_csv(path)?;

    let mut records = Vec::new();
    for result in reader.deserialize::<CountryRow>() {
        let row = result.map_err(|e| csv_error(path, e))?;
        records.push(CountrySubscriptionRecord {
            video_title: row.video_title,
            country_code: row.country_code.trim().to_string(),
            is_subscribed: row.is_subscribed,
            views: row.views,
        });
    }

    debug!(
        "Loaded {} country/subscription rows from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Read the per-day export by header name. Rows without a video id are
/// skipped.
pub fn load_daily_performance(
    path: &Path,
    tz: &TimezoneHandler,
) -> Result<Vec<DailyPerformanceRecord>> {
    let mut reader = open_csv(path)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize::<DailyRow>() {
        let row = result.map_err(|e| csv_error(path, e))?;
        let Some(video_id) = VideoId::parse(&row.video_id) else {
            skipped += 1;
            continue;
        };
        records.push(DailyPerformanceRecord {
            video_id,
            video_title: row.video_title,
            date: parse_timestamp(tz, &row.date)?,
            views: row.views,
        });
    }

    if skipped > 0 {
        debug!("Skipped {} daily rows without a video id", skipped);
    }
    debug!(
        "Loaded {} daily rows from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

// ── Row mapping ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CountryRow {
    #[serde(rename = "Video Title")]
    video_title: String,
    #[serde(rename = "Country Code", default)]
    country_code: String,
    #[serde(rename = "Is Subscribed", deserialize_with = "deserialize_flag")]
    is_subscribed: bool,
    #[serde(rename = "Views", deserialize_with = "deserialize_count")]
    views: f64,
}

#[derive(Debug, Deserialize)]
struct DailyRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Video Title", default)]
    video_title: String,
    #[serde(rename = "External Video ID", default)]
    video_id: String,
    #[serde(rename = "Views", deserialize_with = "deserialize_count")]
    views: f64,
}

fn parse_video_row(
    video_id: VideoId,
    record: &StringRecord,
    line: usize,
    tz: &TimezoneHandler,
) -> Result<VideoRecord> {
    let cell = |i: usize| record.get(i).unwrap_or("");
    let number = |i: usize| parse_number(VIDEO_COLUMNS[i], cell(i));

    let average_view_duration =
        parse_view_duration(cell(12)).ok_or_else(|| DashError::DurationParse {
            row: line,
            value: cell(12).to_string(),
        })?;

    Ok(VideoRecord {
        video_id,
        title: cell(1).to_string(),
        publish_time: parse_timestamp(tz, cell(2))?,
        comments_added: number(3)?,
        shares: number(4)?,
        dislikes: number(5)?,
        likes: number(6)?,
        subscribers_lost: number(7)?,
        subscribers_gained: number(8)?,
        rpm_usd: number(9)?,
        cpm_usd: number(10)?,
        average_percent_viewed: number(11)?,
        average_view_duration,
        views: number(13)?,
        watch_time_hours: number(14)?,
        subscribers: number(15)?,
        estimated_revenue_usd: number(16)?,
        impressions: number(17)?,
        impressions_ctr: number(18)?,
        avg_duration_sec: f64::NAN,
        engagement_ratio: f64::NAN,
        views_per_sub_gained: f64::NAN,
    })
}

/// Empty cells are missing values (NaN); anything else must parse.
fn parse_number(column: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| DashError::NumberParse {
        column: column.to_string(),
        value: raw.to_string(),
    })
}

fn parse_timestamp(tz: &TimezoneHandler, raw: &str) -> Result<NaiveDateTime> {
    tz.parse_timestamp(raw)
        .ok_or_else(|| DashError::TimestampParse(raw.to_string()))
}

fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| serde::de::Error::custom(format!("invalid number {raw:?}")))
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(serde::de::Error::custom(format!(
            "invalid subscription flag {raw:?}"
        ))),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path).map_err(|source| DashError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new().has_headers(true).from_reader(file))
}

fn csv_error(path: &Path, source: csv::Error) -> DashError {
    DashError::CsvParse {
        path: PathBuf::from(path),
        source,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{video_row, write_file, write_video_file, VIDEO_HEADER};
    use tempfile::TempDir;

    // ── load_video_metrics ───────────────────────────────────────────────────

    #[test]
    fn test_load_video_metrics_drops_total_row() {
        let tmp = TempDir::new().unwrap();
        let path = write_video_file(
            tmp.path(),
            &[
                video_row("a1", "First", "2022-01-10", 1000, 84),
                video_row("b2", "Second", "2021-12-01", 2000, 60),
            ],
        );

        let (videos, raw) = load_video_metrics(&path, &TimezoneHandler::default()).unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].video_id.as_str(), "a1");
        assert_eq!(videos[1].title, "Second");
        assert_eq!(videos[0].views, 1000.0);
        // Raw table keeps the summary row untouched.
        assert_eq!(raw.rows.len(), 3);
        assert_eq!(raw.rows[0][0], "Total");
        assert_eq!(raw.headers[9], "RPM (USD)");
    }

    #[test]
    fn test_load_video_metrics_without_total_row_keeps_all() {
        let tmp = TempDir::new().unwrap();
        let first = video_row("a1", "First", "2022-01-10", 1000, 84);
        let second = video_row("b2", "Second", "2021-12-01", 2000, 60);
        let path = write_file(
            tmp.path(),
            VIDEO_METRICS_FILE,
            &[VIDEO_HEADER, &first, &second],
        );

        let (videos, _) = load_video_metrics(&path, &TimezoneHandler::default()).unwrap();
        assert_eq!(videos.len(), 2);
    }

    #[test]
    fn test_load_video_metrics_rejects_wrong_column_count() {
        let tmp = TempDir::new().unwrap();
        let header: Vec<&str> = VIDEO_HEADER.split(',').take(18).collect();
        let header = header.join(",");
        let path = write_file(tmp.path(), VIDEO_METRICS_FILE, &[&header]);

        let err = load_video_metrics(&path, &TimezoneHandler::default()).unwrap_err();
        match err {
            DashError::ColumnCount { expected, found, .. } => {
                assert_eq!(expected, 19);
                assert_eq!(found, 18);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_video_metrics_bad_duration() {
        let tmp = TempDir::new().unwrap();
        let row = video_row("a1", "First", "2022-01-10", 1000, 84).replace("0:07:41", "7:41");
        let path = write_video_file(tmp.path(), &[row]);

        let err = load_video_metrics(&path, &TimezoneHandler::default()).unwrap_err();
        match err {
            DashError::DurationParse { row, value } => {
                assert_eq!(row, 3);
                assert_eq!(value, "7:41");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_video_metrics_bad_timestamp() {
        let tmp = TempDir::new().unwrap();
        let path = write_video_file(tmp.path(), &[video_row("a1", "First", "someday", 1, 1)]);

        let err = load_video_metrics(&path, &TimezoneHandler::default()).unwrap_err();
        assert!(matches!(err, DashError::TimestampParse(ref s) if s == "someday"));
    }

    #[test]
    fn test_load_video_metrics_empty_cell_is_nan() {
        let tmp = TempDir::new().unwrap();
        let row = video_row("a1", "First", "2022-01-10", 1000, 84).replace(",3.5,", ",,");
        let path = write_video_file(tmp.path(), &[row]);

        let (videos, _) = load_video_metrics(&path, &TimezoneHandler::default()).unwrap();
        assert!(videos[0].rpm_usd.is_nan());
    }

    #[test]
    fn test_load_video_metrics_non_numeric_cell_is_error() {
        let tmp = TempDir::new().unwrap();
        let row = video_row("a1", "First", "2022-01-10", 1000, 84).replace(",3.5,", ",lots,");
        let path = write_video_file(tmp.path(), &[row]);

        let err = load_video_metrics(&path, &TimezoneHandler::default()).unwrap_err();
        match err {
            DashError::NumberParse { column, value } => {
                assert_eq!(column, "RPM(USD)");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_video_metrics_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_video_metrics(&tmp.path().join("nope.csv"), &TimezoneHandler::default())
            .unwrap_err();
        assert!(matches!(err, DashError::FileRead { .. }));
    }

    // ── load_country_subscription ────────────────────────────────────────────

    #[test]
    fn test_load_country_subscription_by_header() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            COUNTRY_SUBSCRIPTION_FILE,
            &[
                "Video Title,External Video ID,Video Length,Thumbnail link,Country Code,Is Subscribed,Views",
                "First,a1,300,x,US,True,120",
                "First,a1,300,x,IN,false,80",
                "First,a1,300,x,,1,5",
                "First,a1,300,x,FR,0,",
            ],
        );

        let rows = load_country_subscription(&path).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_subscribed);
        assert!(!rows[1].is_subscribed);
        assert_eq!(rows[2].country_code, "");
        assert!(rows[2].is_subscribed);
        assert!(rows[3].views.is_nan());
    }

    #[test]
    fn test_load_country_subscription_bad_flag() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            COUNTRY_SUBSCRIPTION_FILE,
            &["Video Title,Country Code,Is Subscribed,Views", "First,US,maybe,1"],
        );
        assert!(matches!(
            load_country_subscription(&path),
            Err(DashError::CsvParse { .. })
        ));
    }

    // ── load_daily_performance ───────────────────────────────────────────────

    #[test]
    fn test_load_daily_performance_skips_blank_ids() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            DAILY_PERFORMANCE_FILE,
            &[
                "Date,Video Title,External Video ID,Video Length,Views",
                "2022-01-10,First,a1,300,40",
                "11 Jan 2022,First,a1,300,25",
                "2022-01-12,Orphan,,300,9",
            ],
        );

        let rows = load_daily_performance(&path, &TimezoneHandler::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].views, 25.0);
        assert_eq!(rows[1].date.format("%Y-%m-%d").to_string(), "2022-01-11");
    }

    // ── ingest ───────────────────────────────────────────────────────────────

    #[test]
    fn test_ingest_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("exports");
        assert!(matches!(
            ingest(&missing, &TimezoneHandler::default()),
            Err(DashError::DataPathNotFound(_))
        ));
    }

    #[test]
    fn test_ingest_enriches_and_sorts() {
        let tmp = TempDir::new().unwrap();
        write_video_file(
            tmp.path(),
            &[
                video_row("old", "Old", "2021-06-01", 1000, 84),
                video_row("new", "New", "2022-01-10", 1000, 84),
            ],
        );
        write_file(
            tmp.path(),
            COUNTRY_SUBSCRIPTION_FILE,
            &["Video Title,Country Code,Is Subscribed,Views", "New,US,True,10"],
        );
        write_file(
            tmp.path(),
            DAILY_PERFORMANCE_FILE,
            &["Date,Video Title,External Video ID,Views", "2022-01-10,New,new,10"],
        );

        let data = ingest(tmp.path(), &TimezoneHandler::default()).unwrap();
        assert_eq!(data.videos[0].video_id.as_str(), "new");
        assert_eq!(data.videos[0].avg_duration_sec, 461.0);
        assert_eq!(data.videos[0].engagement_ratio, 0.1);
        assert_eq!(data.country_subscriptions.len(), 1);
        assert_eq!(data.daily_performance.len(), 1);
    }
}
