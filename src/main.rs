//! DigiSModEditor - headless entry point.
//!
//! # Overview
//!
//! This binary wires the library together without a GUI. It initializes:
//! - Logging infrastructure (file rotation + console output)
//! - Tokio runtime driving the queue poll timer
//! - Configuration loading ([`ConfigManager`])
//! - A [`ModelRegistry`] for the configured asset database
//!
//! The threading model mirrors the editor:
//! - **Scanner threads**: one `asset-scanner` std::thread per scanned directory
//! - **Tokio interval**: drains one queued asset group per model every
//!   `queue_poll_interval_ms`
//!
//! # Execution Flow
//!
//! 1. Load `DigiSModEditor Settings.yaml` from `~/Documents/DigiSModEditor`
//! 2. Create the project, packed-mods and log directories
//! 3. Initialize logging → `Logs/digismod.<date>`
//! 4. List existing project mods
//! 5. If a database directory is configured, scan it and materialize its tree
//! 6. Log a summary and shut down
//!
//! # Environment
//!
//! Any setting can be overridden with a `DIGISMOD_` prefixed variable, e.g.
//! `DIGISMOD_DATABASE_DIR=/games/dsdb` or `DIGISMOD_DEBUG_MODE=true`.

use anyhow::{Context, Result};
use digismod::models::default_app_dir;
use digismod::services::list_project_mods;
use digismod::{APP_NAME, ConfigManager, ModelRegistry, UserConfig, VERSION};
use std::time::Duration;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new(default_app_dir())?;
    let user_config = config_manager.load_user_config()?;
    config_manager.ensure_directories(&user_config)?;

    let _guard = digismod::logging::setup_logging(
        &user_config.log_dir,
        digismod::logging::LOG_PREFIX,
        user_config.debug_mode,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("digismod-worker")
        .build()?;

    let project_mods = list_project_mods(&user_config.project_mods_dir)?;
    tracing::info!(
        "Found {} project mod(s) in {}",
        project_mods.len(),
        user_config.project_mods_dir
    );
    for project in &project_mods {
        tracing::info!("  {}", project);
    }

    let result = runtime.block_on(scan_database(&user_config));

    runtime.shutdown_timeout(Duration::from_secs(5));
    tracing::info!("Shutdown complete");

    result
}

/// Scan the configured database and drain its queue until the tree is complete.
async fn scan_database(user_config: &UserConfig) -> Result<()> {
    let Some(database_dir) = user_config.database_dir.as_deref() else {
        tracing::info!("No database directory configured, nothing to scan");
        return Ok(());
    };

    let mut registry = ModelRegistry::from_config(user_config);
    registry
        .open_database(database_dir)
        .with_context(|| format!("Failed to open asset database: {}", database_dir))?;
    registry.rescan(database_dir, digismod::services::scanner::unix_timestamp())?;

    let mut ticker =
        tokio::time::interval(Duration::from_millis(user_config.queue_poll_interval_ms.max(1)));
    while registry.is_busy() {
        ticker.tick().await;
        registry.poll();
    }

    if let Some(model) = registry.get(database_dir) {
        let files: usize = model.to_groups().iter().map(|g| g.file_count()).sum();
        tracing::info!(
            "Scan of {} complete: {} asset(s), {} file(s)",
            database_dir,
            model.root_count(),
            files
        );
    }

    Ok(())
}
