//! Snapshot dump and restore.

use std::path::PathBuf;
use std::sync::Arc;

use pantry_core::catalog::ProductManager;
use pantry_core::config::LoadOptions;
use pantry_core::errors::ApplicationError;
use pantry_core::report::NullReportSink;
use pantry_db::{JsonFileSnapshotStore, SnapshotStore};

use crate::bootstrap::open_catalog;
use crate::commands::{current_thread_runtime, load_config, CommandResult};

/// Writes the current catalog to `path`, or to the configured snapshot path.
pub fn dump(options: LoadOptions, path: Option<PathBuf>) -> CommandResult {
    let config = match load_config("dump", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match current_thread_runtime("dump") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let target = path.unwrap_or_else(|| config.catalog.snapshot_path.clone());
    let result = runtime.block_on(async {
        let catalog = open_catalog(&config).await?;
        let snapshot = catalog.manager.snapshot();
        JsonFileSnapshotStore::new(&target).save(&snapshot).await.map_err(ApplicationError::from)?;
        Ok::<_, anyhow::Error>(snapshot)
    });

    match result {
        Ok(snapshot) => CommandResult::success(
            "dump",
            format!(
                "dumped {} products and {} reviews to {}",
                snapshot.products.len(),
                snapshot.review_count(),
                target.display()
            ),
        ),
        Err(error) => CommandResult::from_anyhow("dump", &error),
    }
}

/// Validates the snapshot at `path` by rebuilding a catalog from it, then
/// installs it at the configured snapshot path so later commands start
/// from it.
pub fn restore(options: LoadOptions, path: Option<PathBuf>) -> CommandResult {
    let config = match load_config("restore", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match current_thread_runtime("restore") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let source = path.unwrap_or_else(|| config.catalog.snapshot_path.clone());
    let result = runtime.block_on(async {
        let snapshot = JsonFileSnapshotStore::new(&source)
            .load()
            .await
            .map_err(ApplicationError::from)?
            .ok_or_else(|| {
                ApplicationError::Persistence(format!("no snapshot found at {}", source.display()))
            })?;

        let manager = ProductManager::from_snapshot(snapshot, Arc::new(NullReportSink))?;
        let restored = manager.snapshot();
        if source != config.catalog.snapshot_path {
            JsonFileSnapshotStore::new(&config.catalog.snapshot_path)
                .save(&restored)
                .await
                .map_err(ApplicationError::from)?;
        }
        Ok::<_, ApplicationError>(restored)
    });

    match result {
        Ok(snapshot) => CommandResult::success(
            "restore",
            format!(
                "restored {} products and {} reviews from {}",
                snapshot.products.len(),
                snapshot.review_count(),
                source.display()
            ),
        ),
        Err(error) => CommandResult::from_error("restore", &error),
    }
}
