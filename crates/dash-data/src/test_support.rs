//! Fixtures shared by the unit tests of this crate.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, NaiveTime};
use dash_core::metrics::DerivedMetrics;
use dash_core::models::{VideoId, VideoRecord};

use crate::reader::VIDEO_METRICS_FILE;

pub(crate) const VIDEO_HEADER: &str = "Video,Video title,Video publish time,Comments added,Shares,Dislikes,Likes,Subscribers lost,Subscribers gained,RPM (USD),CPM (USD),Average percentage viewed (%),Average view duration,Views,Watch time (hours),Subscribers,Your estimated revenue (USD),Impressions,Impressions click-through rate (%)";

pub(crate) const TOTAL_ROW: &str =
    "Total,,,1000,500,20,8000,100,2000,4.0,8.0,40.0,0:05:00,200000,5000,1900,800,2000000,5.0";

/// A per-video CSV row with the given id, title, publish date, views and
/// likes; the other counters are fixed.
pub(crate) fn video_row(id: &str, title: &str, published: &str, views: u32, likes: u32) -> String {
    format!(
        "{id},{title},{published},10,5,1,{likes},2,20,3.5,7.0,41.5,0:07:41,{views},120.0,18,35.0,20000,4.2"
    )
}

pub(crate) fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n")).expect("write fixture");
    path
}

/// Write the per-video export with a Total row followed by `rows`.
pub(crate) fn write_video_file(dir: &Path, rows: &[String]) -> PathBuf {
    let mut lines: Vec<&str> = vec![VIDEO_HEADER, TOTAL_ROW];
    lines.extend(rows.iter().map(String::as_str));
    write_file(dir, VIDEO_METRICS_FILE, &lines)
}

/// An enriched video titled `Video {id}`.
pub(crate) fn video(id: &str, publish_time: NaiveDateTime, views: f64) -> VideoRecord {
    DerivedMetrics::enrich(VideoRecord {
        video_id: VideoId::parse(id).expect("non-blank id"),
        title: format!("Video {id}"),
        publish_time,
        comments_added: 10.0,
        shares: 5.0,
        dislikes: 1.0,
        likes: 84.0,
        subscribers_lost: 2.0,
        subscribers_gained: 20.0,
        rpm_usd: 3.5,
        cpm_usd: 7.0,
        average_percent_viewed: 41.5,
        average_view_duration: NaiveTime::from_hms_opt(0, 7, 41).expect("valid time"),
        views,
        watch_time_hours: 120.0,
        subscribers: 18.0,
        estimated_revenue_usd: 35.0,
        impressions: 20_000.0,
        impressions_ctr: 4.2,
        avg_duration_sec: f64::NAN,
        engagement_ratio: f64::NAN,
        views_per_sub_gained: f64::NAN,
    })
}
