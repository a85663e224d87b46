use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dash_data::reader::VIDEO_METRICS_FILE;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Root of everything the dashboard writes: `~/.channel-dash/`.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".channel-dash")
}

/// Ensure `~/.channel-dash/` and `~/.channel-dash/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name to an [`EnvFilter`] directive.
fn filter_directive(log_level: &str) -> &'static str {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug",
        "WARNING" | "WARN" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "info",
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to stderr, or is appended to `log_file` without ANSI colours
/// when one is given. Stderr is hidden by the alternate screen while the TUI
/// runs, so `--log-file` is the way to keep logs from an interactive session.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    Ok(())
}

// ── Data-directory discovery ───────────────────────────────────────────────────

/// Pick the directory holding the exports.
///
/// An explicit `--data-dir` is always used as given, so a wrong path surfaces
/// as a load error. Otherwise the first candidate containing the per-video
/// export wins:
/// 1. the current directory
/// 2. `./data/`
/// 3. `~/.channel-dash/data/`
///
/// Falls back to the current directory when none match.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    discover_data_dir().unwrap_or_else(|| PathBuf::from("."))
}

pub fn discover_data_dir() -> Option<PathBuf> {
    let mut candidates = vec![PathBuf::from("."), PathBuf::from("data")];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".channel-dash").join("data"));
    }
    first_with_exports(candidates)
}

fn first_with_exports(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .find(|dir| dir.join(VIDEO_METRICS_FILE).is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
