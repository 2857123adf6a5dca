use crate::output::Output;
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use watch_sync_config::{Config, PathManager};
use watch_sync_core::{write_report, SyncEngine};
use watch_sync_sources::{SqliteProgressStore, TraktClient};

pub async fn run_sync(report_path: Option<PathBuf>, output: &Output) -> Result<()> {
    tracing::debug!("Sync command started");

    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to prepare directories: {}", e))?;

    let config = Config::load_or_default(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load configuration: {}", e))?;

    let store_config = config.store.as_ref().ok_or_else(|| {
        color_eyre::eyre::eyre!(
            "No progress database configured. Run `karelka config store` first."
        )
    })?;
    let trakt_config = config.trakt.as_ref().ok_or_else(|| {
        color_eyre::eyre::eyre!("Trakt is not configured. Run `karelka config trakt` first.")
    })?;

    // Fatal if the database cannot be opened; nothing has been sent yet
    let store = SqliteProgressStore::connect(&store_config.database_url)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let mut client = TraktClient::new(
        trakt_config.client_id.clone(),
        trakt_config.client_secret.clone(),
    );
    client
        .authenticate()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Trakt authentication failed: {}", e))?;

    // No record of what earlier runs already submitted; a rerun over an
    // unchanged store will duplicate entries in the remote history
    tracing::warn!(
        "No duplicate detection across runs: previously synced records are submitted again"
    );

    let spinner = make_spinner(output);
    if let Some(pb) = &spinner {
        pb.set_message("Syncing watch history...");
    }

    let engine = SyncEngine::new(&store, &client);
    let run_result = engine.run().await;

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    let report = run_result.map_err(|e| color_eyre::eyre::eyre!("Sync run failed: {}", e))?;

    let report_file = report_path
        .or_else(|| config.report.path.clone())
        .unwrap_or_else(|| path_manager.report_file());
    write_report(&report_file, &report)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write sync report: {}", e))?;

    match output.format() {
        crate::output::OutputFormat::Human => {
            output.success(format!(
                "Sync completed: {} synced, {} failed",
                report.synced_count, report.failed_count
            ));
            for item in &report.failed_items {
                output.warn(format!(
                    "{} '{}' ({}): {}",
                    item.media_type, item.title, item.external_id, item.error
                ));
            }
            output.info(format!("Report written to {}", report_file.display()));
        }
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            output.json(&json!({
                "success": true,
                "synced_count": report.synced_count,
                "failed_count": report.failed_count,
                "report_path": report_file.display().to_string(),
            }));
        }
    }

    Ok(())
}

/// Spinner while the engine runs; per-item progress goes through tracing so
/// non-interactive runs still get structured lines.
fn make_spinner(output: &Output) -> Option<ProgressBar> {
    let interactive = std::io::stdout().is_terminal() && std::io::stderr().is_terminal();
    if output.is_quiet() || !interactive || output.format() != crate::output::OutputFormat::Human {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}
