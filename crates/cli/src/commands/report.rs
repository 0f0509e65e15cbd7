use pantry_core::config::LoadOptions;
use pantry_core::domain::product::ProductId;
use pantry_core::errors::ApplicationError;
use pantry_core::locale::Locale;

use crate::bootstrap::open_catalog;
use crate::commands::{current_thread_runtime, load_config, CommandResult};

const CLIENT: &str = "cli";

pub fn run(options: LoadOptions, id: u32, locale: &str) -> CommandResult {
    let locale = match locale.parse::<Locale>() {
        Ok(locale) => locale,
        Err(error) => return CommandResult::from_error("report", &error.into()),
    };
    let config = match load_config("report", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match current_thread_runtime("report") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let catalog = match runtime.block_on(open_catalog(&config)) {
        Ok(catalog) => catalog,
        Err(error) => return CommandResult::from_anyhow("report", &error),
    };

    let id = ProductId(id);
    if let Err(error) = catalog.manager.print_product_report(id, locale, CLIENT) {
        return CommandResult::from_error("report", &error);
    }

    match &catalog.captured_reports {
        Some(captured) => match captured.reports().pop() {
            Some(report) => CommandResult::text(report.text),
            None => CommandResult::from_error(
                "report",
                &ApplicationError::Persistence(format!("report for product {id} was not captured")),
            ),
        },
        None => {
            let directory =
                config.reports.directory.map(|path| path.display().to_string()).unwrap_or_default();
            let message = format!("report for product {id} written to {directory}");
            CommandResult::success("report", message)
        }
    }
}
