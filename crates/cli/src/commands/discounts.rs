use pantry_core::config::LoadOptions;
use pantry_core::locale::Locale;

use crate::bootstrap::open_catalog;
use crate::commands::{current_thread_runtime, load_config, CommandResult};

/// One `stars<TAB>total` line per rating present in the catalog.
pub fn run(options: LoadOptions, locale: &str) -> CommandResult {
    let locale = match locale.parse::<Locale>() {
        Ok(locale) => locale,
        Err(error) => return CommandResult::from_error("discounts", &error.into()),
    };
    let config = match load_config("discounts", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match current_thread_runtime("discounts") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let catalog = match runtime.block_on(open_catalog(&config)) {
        Ok(catalog) => catalog,
        Err(error) => return CommandResult::from_anyhow("discounts", &error),
    };

    let lines: Vec<String> = catalog
        .manager
        .discounts(locale)
        .into_iter()
        .map(|(rating, total)| format!("{}\t{total}", rating.stars()))
        .collect();
    CommandResult::text(lines.join("\n"))
}
