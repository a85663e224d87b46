mod bootstrap;

use anyhow::{Context, Result};
use dash_core::settings::Settings;
use dash_data::presentation::{parse_top_n, DashboardSnapshot};
use dash_runtime::data_manager::DataManager;
use dash_ui::app::{App, ViewMode};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Channel Dash v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Output: {}, Timezone: {}, Theme: {}",
        settings.view,
        settings.output,
        settings.timezone,
        settings.theme
    );

    let top_n = parse_top_n(&settings.top_n)?;
    let data_dir = bootstrap::resolve_data_dir(settings.data_dir.as_deref());
    tracing::info!("Reading exports from {}", data_dir.display());

    let mut manager = DataManager::new(data_dir.clone(), &settings.timezone);
    let analysis = manager
        .get_data()
        .with_context(|| format!("failed to load exports from {}", data_dir.display()))?;

    match settings.output.as_str() {
        "json" => {
            let snapshot = DashboardSnapshot::build(analysis, top_n, settings.video.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        "tui" => {
            let mut app = App::new(
                analysis,
                &settings.theme,
                ViewMode::from_name(&settings.view),
                &settings.timezone,
                top_n,
            );
            if let Some(title) = settings.video.as_deref() {
                app = app.with_selected_video(title);
            }

            // The loop exits on 'q' / Ctrl+C inside the TUI. The OS-level
            // handler covers signals delivered outside raw mode.
            tokio::select! {
                result = app.run() => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                }
            }
        }

        unknown => {
            eprintln!("Unknown output mode: {}", unknown);
        }
    }

    Ok(())
}
