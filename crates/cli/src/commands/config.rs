use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pantry_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

/// Effective configuration, one line per key with the layer it came from.
pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = options.config_path.clone().or_else(detect_config_path);
    let overrides = options.overrides.clone();
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(
            key_path,
            override_flag(&overrides, key_path),
            env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        )
    };

    let mut lines = vec![
        "effective config (source precedence: override > env > file > default):".to_string()
    ];

    lines.push(render_line(
        "catalog.seed_products",
        &display_optional_path(config.catalog.seed_products.as_deref()),
        source("catalog.seed_products", &["PANTRY_CATALOG_SEED_PRODUCTS"]),
    ));
    lines.push(render_line(
        "catalog.seed_reviews",
        &display_optional_path(config.catalog.seed_reviews.as_deref()),
        source("catalog.seed_reviews", &["PANTRY_CATALOG_SEED_REVIEWS"]),
    ));
    lines.push(render_line(
        "catalog.snapshot_path",
        &config.catalog.snapshot_path.display().to_string(),
        source("catalog.snapshot_path", &["PANTRY_CATALOG_SNAPSHOT_PATH"]),
    ));
    lines.push(render_line(
        "reports.directory",
        &display_optional_path(config.reports.directory.as_deref()),
        source("reports.directory", &["PANTRY_REPORTS_DIRECTORY"]),
    ));

    let simulation = &config.simulation;
    for (key, value, env_key) in [
        ("simulation.clients", simulation.clients.to_string(), "PANTRY_SIMULATION_CLIENTS"),
        ("simulation.pool_size", simulation.pool_size.to_string(), "PANTRY_SIMULATION_POOL_SIZE"),
        (
            "simulation.product_id_min",
            simulation.product_id_min.to_string(),
            "PANTRY_SIMULATION_PRODUCT_ID_MIN",
        ),
        (
            "simulation.product_id_max",
            simulation.product_id_max.to_string(),
            "PANTRY_SIMULATION_PRODUCT_ID_MAX",
        ),
        (
            "simulation.review_rating",
            simulation.review_rating.to_string(),
            "PANTRY_SIMULATION_REVIEW_RATING",
        ),
        (
            "simulation.review_comment",
            simulation.review_comment.clone(),
            "PANTRY_SIMULATION_REVIEW_COMMENT",
        ),
    ] {
        lines.push(render_line(key, &value, source(key, &[env_key])));
    }

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["PANTRY_LOGGING_LEVEL", "PANTRY_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["PANTRY_LOGGING_FORMAT", "PANTRY_LOG_FORMAT"]),
    ));

    CommandResult::text(lines.join("\n"))
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("pantry.toml"), PathBuf::from("config/pantry.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

/// Command-line flag that set `key_path`, if any.
fn override_flag(overrides: &ConfigOverrides, key_path: &str) -> Option<&'static str> {
    let (set, flag) = match key_path {
        "catalog.seed_products" => (overrides.seed_products.is_some(), "--seed-products"),
        "catalog.seed_reviews" => (overrides.seed_reviews.is_some(), "--seed-reviews"),
        "catalog.snapshot_path" => (overrides.snapshot_path.is_some(), "--snapshot"),
        "reports.directory" => (overrides.reports_directory.is_some(), "--reports-dir"),
        "simulation.clients" => (overrides.clients.is_some(), "--clients"),
        "simulation.pool_size" => (overrides.pool_size.is_some(), "--pool-size"),
        "logging.level" => (overrides.log_level.is_some(), "--log-level"),
        _ => return None,
    };
    set.then_some(flag)
}

fn field_source(
    key_path: &str,
    override_flag: Option<&str>,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(flag) = override_flag {
        return format!("override ({flag})");
    }

    // Blank variables are skipped when the config is loaded.
    let env_key = env_keys
        .iter()
        .find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn display_optional_path(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string()).unwrap_or_else(|| "<unset>".to_string())
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::contains_path;

    #[test]
    fn nested_keys_are_found_in_file_document() {
        let doc: Value = "[simulation]\nclients = 9\n".parse().expect("toml document");

        assert!(contains_path(&doc, "simulation.clients"));
        assert!(!contains_path(&doc, "simulation.pool_size"));
        assert!(!contains_path(&doc, "logging.level"));
    }
}
