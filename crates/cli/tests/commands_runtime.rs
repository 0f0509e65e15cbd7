use std::env;
use std::sync::{Mutex, OnceLock};

use pantry_cli::commands::{config, discounts, dump, locales, report, simulate};
use pantry_core::config::{ConfigOverrides, LoadOptions};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn locales_lists_supported_tags() {
    let result = locales::run();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output, "en-GB\nen-US\nes-US\nfr-FR\nzh-CN");
}

#[test]
fn discounts_sum_demo_catalog_per_rating() {
    let dir = TempDir::new().expect("temp dir");
    let snapshot = dir.path().join("snapshot.json");
    with_env(&[("PANTRY_CATALOG_SNAPSHOT_PATH", path_str(&snapshot))], || {
        let result = discounts::run(LoadOptions::default(), "en-GB");
        assert_eq!(result.exit_code, 0, "expected discount listing");

        assert_eq!(
            result.output,
            "★★☆☆☆\t£0.25\n★★★☆☆\t£0.45\n★★★★☆\t£0.45\n★★★★★\t£0.40"
        );
    });
}

#[test]
fn report_renders_header_and_review_lines() {
    let dir = TempDir::new().expect("temp dir");
    let snapshot = dir.path().join("snapshot.json");
    with_env(&[("PANTRY_CATALOG_SNAPSHOT_PATH", path_str(&snapshot))], || {
        let result = report::run(LoadOptions::default(), 104, "en-GB");
        assert_eq!(result.exit_code, 0, "expected rendered report");

        assert_eq!(
            result.output,
            "104, Cookie, £2.50, £0.25, ★★★☆☆, 31/12/2026\n★★★☆☆\tJust another cookie\n★★☆☆☆\tOk"
        );
    });
}

#[test]
fn report_for_unknown_product_is_not_found() {
    let dir = TempDir::new().expect("temp dir");
    let snapshot = dir.path().join("snapshot.json");
    with_env(&[("PANTRY_CATALOG_SNAPSHOT_PATH", path_str(&snapshot))], || {
        let result = report::run(LoadOptions::default(), 164, "en-US");
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "report");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "not_found");
    });
}

#[test]
fn report_rejects_unsupported_locale() {
    with_env(&[], || {
        let result = report::run(LoadOptions::default(), 101, "ru-RU");
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_argument");
    });
}

#[test]
fn simulate_writes_one_report_per_client() {
    let dir = TempDir::new().expect("temp dir");
    let snapshot = dir.path().join("snapshot.json");
    let reports = dir.path().join("reports");
    with_env(
        &[
            ("PANTRY_CATALOG_SNAPSHOT_PATH", path_str(&snapshot)),
            ("PANTRY_REPORTS_DIRECTORY", path_str(&reports)),
            ("PANTRY_SIMULATION_CLIENTS", "3"),
            ("PANTRY_SIMULATION_POOL_SIZE", "2"),
            ("PANTRY_SIMULATION_PRODUCT_ID_MIN", "103"),
            ("PANTRY_SIMULATION_PRODUCT_ID_MAX", "103"),
        ],
        || {
            let result = simulate::run(LoadOptions::default(), true);
            assert_eq!(result.exit_code, 0, "expected simulation to finish");

            for client in ["Client 1", "Client 2", "Client 3"] {
                assert!(result.output.contains(&format!("{client} pantry-thread-")));
            }
            assert_eq!(result.output.matches("Product 103 reviewed").count(), 3);
            for number in 1..=3 {
                let file = format!("product103_Client_{number}.txt");
                assert!(reports.join(&file).exists(), "missing report file {file}");
            }
            assert!(snapshot.exists(), "--save should write the snapshot");
        },
    );
}

#[test]
fn default_simulation_reviews_demo_products() {
    let dir = TempDir::new().expect("temp dir");
    let snapshot = dir.path().join("snapshot.json");
    with_env(&[("PANTRY_CATALOG_SNAPSHOT_PATH", path_str(&snapshot))], || {
        let result = simulate::run(LoadOptions::default(), false);
        assert_eq!(result.exit_code, 0, "expected simulation to finish");

        let verdicts: Vec<&str> =
            result.output.lines().filter(|line| line.starts_with("Product ")).collect();
        assert_eq!(verdicts.len(), 5, "one verdict per default client");
        assert!(verdicts.iter().all(|line| !line.ends_with("not reviewed")), "{verdicts:?}");
    });
}

#[test]
fn simulate_fails_fast_on_invalid_pool_size() {
    with_env(&[("PANTRY_SIMULATION_POOL_SIZE", "0")], || {
        let result = simulate::run(LoadOptions::default(), false);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "simulate");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn dump_then_restore_installs_snapshot() {
    let dir = TempDir::new().expect("temp dir");
    let active = dir.path().join("active.json");
    let exported = dir.path().join("export/catalog.json");
    with_env(&[("PANTRY_CATALOG_SNAPSHOT_PATH", path_str(&active))], || {
        let dumped = dump::dump(LoadOptions::default(), Some(exported.clone()));
        assert_eq!(dumped.exit_code, 0, "expected dump success");
        let payload = parse_payload(&dumped.output);
        assert_eq!(payload["status"], "ok");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.starts_with("dumped 6 products and 20 reviews"), "got `{message}`");
        assert!(!active.exists());

        let restored = dump::restore(LoadOptions::default(), Some(exported.clone()));
        assert_eq!(restored.exit_code, 0, "expected restore success");
        assert_eq!(parse_payload(&restored.output)["command"], "restore");
        assert!(active.exists(), "restore should install the active snapshot");
    });
}

#[test]
fn restore_without_snapshot_is_a_persistence_failure() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("missing.json");
    with_env(&[], || {
        let result = dump::restore(LoadOptions::default(), Some(missing.clone()));
        assert_eq!(result.exit_code, 5);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "persistence");
    });
}

#[test]
fn config_attributes_env_values() {
    with_env(&[("PANTRY_SIMULATION_CLIENTS", "7"), ("PANTRY_LOG_LEVEL", "debug")], || {
        let result = config::run(LoadOptions::default());
        assert_eq!(result.exit_code, 0);

        assert!(result
            .output
            .contains("- simulation.clients = 7 (source: env (PANTRY_SIMULATION_CLIENTS))"));
        assert!(result.output.contains("- logging.level = debug (source: env (PANTRY_LOG_LEVEL))"));
        assert!(result.output.contains("- simulation.pool_size = 3 (source: default)"));
    });
}

#[test]
fn config_attributes_command_line_overrides() {
    with_env(&[("PANTRY_LOG_LEVEL", "warn")], || {
        let options = LoadOptions {
            overrides: ConfigOverrides {
                log_level: Some("debug".to_string()),
                reports_directory: Some("flag-reports".into()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        };
        let result = config::run(options);
        assert_eq!(result.exit_code, 0);

        assert!(result.output.contains("- logging.level = debug (source: override (--log-level))"));
        assert!(result
            .output
            .contains("- reports.directory = flag-reports (source: override (--reports-dir))"));
        assert!(result
            .output
            .contains("- catalog.snapshot_path = pantry-snapshot.json (source: default)"));
    });
}

#[test]
fn config_ignores_blank_env_values() {
    with_env(&[("PANTRY_LOG_LEVEL", " "), ("PANTRY_SIMULATION_CLIENTS", "")], || {
        let result = config::run(LoadOptions::default());
        assert_eq!(result.exit_code, 0);

        assert!(result.output.contains("- logging.level = info (source: default)"));
        assert!(result.output.contains("- simulation.clients = 5 (source: default)"));
    });
}

#[test]
fn snapshot_override_is_used_by_dump_and_report() {
    let dir = TempDir::new().expect("temp dir");
    let from_env = dir.path().join("env.json");
    let from_flag = dir.path().join("flag.json");
    with_env(&[("PANTRY_CATALOG_SNAPSHOT_PATH", path_str(&from_env))], || {
        let options = LoadOptions {
            overrides: ConfigOverrides {
                snapshot_path: Some(from_flag.clone()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        };

        let dumped = dump::dump(options.clone(), None);
        assert_eq!(dumped.exit_code, 0, "expected dump success");
        assert!(from_flag.exists(), "dump should write to the overridden path");
        assert!(!from_env.exists());

        let report = report::run(options, 106, "en-GB");
        assert_eq!(report.exit_code, 0, "expected report from the overridden snapshot");
    });
}

fn path_str(path: &std::path::Path) -> &str {
    path.to_str().expect("temp paths are valid UTF-8")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "PANTRY_CATALOG_SEED_PRODUCTS",
        "PANTRY_CATALOG_SEED_REVIEWS",
        "PANTRY_CATALOG_SNAPSHOT_PATH",
        "PANTRY_REPORTS_DIRECTORY",
        "PANTRY_SIMULATION_CLIENTS",
        "PANTRY_SIMULATION_POOL_SIZE",
        "PANTRY_SIMULATION_PRODUCT_ID_MIN",
        "PANTRY_SIMULATION_PRODUCT_ID_MAX",
        "PANTRY_SIMULATION_REVIEW_RATING",
        "PANTRY_SIMULATION_REVIEW_COMMENT",
        "PANTRY_LOGGING_LEVEL",
        "PANTRY_LOGGING_FORMAT",
        "PANTRY_LOG_LEVEL",
        "PANTRY_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
