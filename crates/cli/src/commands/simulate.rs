use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pantry_core::config::LoadOptions;
use pantry_core::errors::ApplicationError;
use pantry_db::{JsonFileSnapshotStore, SnapshotStore};

use crate::bootstrap::open_catalog;
use crate::commands::{load_config, CommandResult};
use crate::driver::{run_clients, SimulationSettings};

/// Runs the concurrent shop simulation and prints each client log in
/// submission order, followed by any reports kept in memory.
pub fn run(options: LoadOptions, save: bool) -> CommandResult {
    let config = match load_config("simulate", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let settings = match SimulationSettings::from_config(&config.simulation) {
        Ok(settings) => Arc::new(settings),
        Err(error) => {
            let error = ApplicationError::Configuration(error.to_string());
            return CommandResult::from_error("simulate", &error);
        }
    };

    // Workers and blocking-pool threads share this numbering.
    let next_thread = Arc::new(AtomicUsize::new(1));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(settings.pool_size)
        .thread_name_fn(move || {
            format!("pantry-thread-{}", next_thread.fetch_add(1, Ordering::Relaxed))
        })
        .enable_all()
        .build();
    let runtime = match runtime {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "simulate",
                "runtime_init",
                format!("failed to initialize worker pool: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let catalog = open_catalog(&config).await?;
        let outcome = run_clients(Arc::clone(&catalog.manager), Arc::clone(&settings)).await;
        if save {
            JsonFileSnapshotStore::new(&config.catalog.snapshot_path)
                .save(&catalog.manager.snapshot())
                .await
                .map_err(ApplicationError::from)?;
        }
        Ok::<_, anyhow::Error>((catalog, outcome))
    });

    let (catalog, outcome) = match result {
        Ok(done) => done,
        Err(error) => return CommandResult::from_anyhow("simulate", &error),
    };

    let mut sections: Vec<String> = outcome.logs.iter().map(|log| log.text.clone()).collect();
    if let Some(captured) = &catalog.captured_reports {
        sections.extend(
            captured
                .reports()
                .into_iter()
                .map(|report| format!("{}\n{}\n", report.file_name(), report.text)),
        );
    }

    let exit_code = if outcome.failed_clients == 0 { 0 } else { 3 };
    CommandResult { exit_code, output: sections.join("\n") }
}
