//! Load-once cache around the analysis pipeline.
//!
//! The exports are static files, so there is no TTL: the first call to
//! [`DataManager::get_data`] reads and analyses them, later calls return the
//! cached [`ChannelAnalysis`] until [`DataManager::invalidate_cache`] is
//! called.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dash_core::time_utils::TimezoneHandler;
use dash_core::Result;
use dash_data::analysis::{analyze_channel, ChannelAnalysis};

// ── DataManager ───────────────────────────────────────────────────────────────

/// Cached wrapper around the full analysis pipeline.
///
/// # Example
/// ```no_run
/// use dash_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new("exports", "UTC");
/// if let Ok(analysis) = mgr.get_data() {
///     println!("videos: {}", analysis.data.videos.len());
/// }
/// ```
pub struct DataManager {
    /// Directory holding the three CSV exports.
    data_dir: PathBuf,
    /// Interprets naive timestamps in the exports.
    timezone: TimezoneHandler,
    /// Most recently loaded analysis.
    cache: Option<ChannelAnalysis>,
    /// When the cache was populated.
    cache_timestamp: Option<Instant>,
    /// Human-readable description of the last load error.
    last_error: Option<String>,
}

impl DataManager {
    /// Create a manager for `data_dir`, reading naive timestamps in `timezone`.
    pub fn new(data_dir: impl Into<PathBuf>, timezone: &str) -> Self {
        Self {
            data_dir: data_dir.into(),
            timezone: TimezoneHandler::new(timezone),
            cache: None,
            cache_timestamp: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the analysis, loading it on first use.
    ///
    /// Load errors are returned to the caller and recorded in
    /// [`last_error`](Self::last_error); nothing is cached on failure.
    pub fn get_data(&mut self) -> Result<&ChannelAnalysis> {
        let analysis = match self.cache.take() {
            Some(cached) => {
                tracing::debug!("returning cached channel analysis");
                cached
            }
            None => self.load()?,
        };
        Ok(self.cache.insert(analysis))
    }

    /// Discard the cached analysis so the next [`get_data`](Self::get_data)
    /// re-reads the files.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// `true` once a load has succeeded and not been invalidated.
    pub fn is_loaded(&self) -> bool {
        self.cache.is_some()
    }

    /// Age of the current cache entry, or `None` if nothing is loaded.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Human-readable description of the last load error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Run the pipeline and record the outcome.
    fn load(&mut self) -> Result<ChannelAnalysis> {
        match analyze_channel(&self.data_dir, &self.timezone) {
            Ok(analysis) => {
                tracing::debug!(
                    videos = analysis.metadata.videos_loaded,
                    daily_rows = analysis.metadata.daily_rows_joined,
                    "analysis cache populated"
                );
                self.cache_timestamp = Some(Instant::now());
                self.last_error = None;
                Ok(analysis)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load channel exports");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dash_data::reader::{COUNTRY_SUBSCRIPTION_FILE, DAILY_PERFORMANCE_FILE, VIDEO_METRICS_FILE};
    use std::fs;
    use tempfile::TempDir;

    const VIDEO_CSV: &str = "\
Video,Video title,Video publish time,Comments added,Shares,Dislikes,Likes,Subscribers lost,Subscribers gained,RPM (USD),CPM (USD),Average percentage viewed (%),Average view duration,Views,Watch time (hours),Subscribers,Your estimated revenue (USD),Impressions,Impressions click-through rate (%)
Total,,,30,15,3,250,6,60,3.5,7.0,41.5,0:07:41,3000,360.0,54,105.0,60000,4.2
A,Alpha,2022-06-01,10,5,1,84,2,20,3.5,7.0,41.5,0:07:41,1000,120.0,18,35.0,20000,4.2
B,Beta,2022-03-01,10,5,1,84,2,20,3.5,7.0,41.5,0:04:00,2000,120.0,18,35.0,20000,4.2
";

    /// Returns a DataManager + TempDir. The TempDir MUST be kept alive for
    /// the duration of the test.
    fn make_manager_with_dir() -> (DataManager, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(VIDEO_METRICS_FILE), VIDEO_CSV).unwrap();
        fs::write(
            dir.path().join(COUNTRY_SUBSCRIPTION_FILE),
            "Video Title,Country Code,Is Subscribed,Views\nAlpha,US,True,10\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(DAILY_PERFORMANCE_FILE),
            "Date,Video Title,External Video ID,Views\n2022-06-01,Alpha,A,40\n",
        )
        .unwrap();
        let mgr = DataManager::new(dir.path(), "UTC");
        (mgr, dir)
    }

    fn remove_exports(dir: &Path) {
        for name in [VIDEO_METRICS_FILE, COUNTRY_SUBSCRIPTION_FILE, DAILY_PERFORMANCE_FILE] {
            fs::remove_file(dir.join(name)).unwrap();
        }
    }

    // ── first load ────────────────────────────────────────────────────────

    #[test]
    fn test_nothing_loaded_before_first_call() {
        let (mgr, _dir) = make_manager_with_dir();
        assert!(!mgr.is_loaded());
        assert!(mgr.cache_age().is_none());
        assert!(mgr.last_error().is_none());
    }

    #[test]
    fn test_first_call_loads() {
        let (mut mgr, _dir) = make_manager_with_dir();
        let analysis = mgr.get_data().expect("load");
        assert_eq!(analysis.data.videos.len(), 2);
        assert_eq!(analysis.data.videos[0].title, "Alpha");
        assert!(mgr.is_loaded());
        assert!(mgr.cache_age().expect("age") < Duration::from_secs(5));
    }

    // ── caching ───────────────────────────────────────────────────────────

    #[test]
    fn test_second_call_does_not_reread() {
        let (mut mgr, dir) = make_manager_with_dir();
        mgr.get_data().expect("load");

        remove_exports(dir.path());

        let cached = mgr.get_data().expect("served from cache");
        assert_eq!(cached.data.videos.len(), 2);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let (mut mgr, dir) = make_manager_with_dir();
        mgr.get_data().expect("load");

        mgr.invalidate_cache();
        assert!(!mgr.is_loaded());
        assert!(mgr.cache_age().is_none());

        remove_exports(dir.path());
        assert!(mgr.get_data().is_err());
        assert!(mgr.last_error().is_some());
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn test_missing_directory_reports_error() {
        let dir = TempDir::new().expect("temp dir");
        let mut mgr = DataManager::new(dir.path().join("missing"), "UTC");

        let err = mgr.get_data().unwrap_err();
        assert!(matches!(err, dash_core::DashError::DataPathNotFound(_)));
        assert!(mgr.last_error().unwrap().contains("missing"));
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn test_error_cleared_after_successful_load() {
        let (mut mgr, dir) = make_manager_with_dir();
        let video_csv = fs::read_to_string(dir.path().join(VIDEO_METRICS_FILE)).unwrap();
        fs::remove_file(dir.path().join(VIDEO_METRICS_FILE)).unwrap();
        assert!(mgr.get_data().is_err());

        fs::write(dir.path().join(VIDEO_METRICS_FILE), video_csv).unwrap();
        assert!(mgr.get_data().is_ok());
        assert!(mgr.last_error().is_none());
    }
}
