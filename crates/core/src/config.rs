use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub reports: ReportsConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub seed_products: Option<PathBuf>,
    pub seed_reviews: Option<PathBuf>,
    pub snapshot_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ReportsConfig {
    pub directory: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub clients: usize,
    pub pool_size: usize,
    pub product_id_min: u32,
    pub product_id_max: u32,
    pub review_rating: u8,
    pub review_comment: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub seed_products: Option<PathBuf>,
    pub seed_reviews: Option<PathBuf>,
    pub snapshot_path: Option<PathBuf>,
    pub reports_directory: Option<PathBuf>,
    pub clients: Option<usize>,
    pub pool_size: Option<usize>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const MAX_POOL_SIZE: usize = 64;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                seed_products: None,
                seed_reviews: None,
                snapshot_path: PathBuf::from("pantry-snapshot.json"),
            },
            reports: ReportsConfig { directory: None },
            simulation: SimulationConfig {
                clients: 5,
                pool_size: 3,
                product_id_min: 101,
                product_id_max: 106,
                review_rating: 4,
                review_comment: "Yet another review".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("pantry.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(seed_products) = catalog.seed_products {
                self.catalog.seed_products = Some(seed_products);
            }
            if let Some(seed_reviews) = catalog.seed_reviews {
                self.catalog.seed_reviews = Some(seed_reviews);
            }
            if let Some(snapshot_path) = catalog.snapshot_path {
                self.catalog.snapshot_path = snapshot_path;
            }
        }

        if let Some(reports) = patch.reports {
            if let Some(directory) = reports.directory {
                self.reports.directory = Some(directory);
            }
        }

        if let Some(simulation) = patch.simulation {
            if let Some(clients) = simulation.clients {
                self.simulation.clients = clients;
            }
            if let Some(pool_size) = simulation.pool_size {
                self.simulation.pool_size = pool_size;
            }
            if let Some(product_id_min) = simulation.product_id_min {
                self.simulation.product_id_min = product_id_min;
            }
            if let Some(product_id_max) = simulation.product_id_max {
                self.simulation.product_id_max = product_id_max;
            }
            if let Some(review_rating) = simulation.review_rating {
                self.simulation.review_rating = review_rating;
            }
            if let Some(review_comment) = simulation.review_comment {
                self.simulation.review_comment = review_comment;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PANTRY_CATALOG_SEED_PRODUCTS") {
            self.catalog.seed_products = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("PANTRY_CATALOG_SEED_REVIEWS") {
            self.catalog.seed_reviews = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("PANTRY_CATALOG_SNAPSHOT_PATH") {
            self.catalog.snapshot_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("PANTRY_REPORTS_DIRECTORY") {
            self.reports.directory = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("PANTRY_SIMULATION_CLIENTS") {
            self.simulation.clients = parse_usize("PANTRY_SIMULATION_CLIENTS", &value)?;
        }
        if let Some(value) = read_env("PANTRY_SIMULATION_POOL_SIZE") {
            self.simulation.pool_size = parse_usize("PANTRY_SIMULATION_POOL_SIZE", &value)?;
        }
        if let Some(value) = read_env("PANTRY_SIMULATION_PRODUCT_ID_MIN") {
            self.simulation.product_id_min = parse_u32("PANTRY_SIMULATION_PRODUCT_ID_MIN", &value)?;
        }
        if let Some(value) = read_env("PANTRY_SIMULATION_PRODUCT_ID_MAX") {
            self.simulation.product_id_max = parse_u32("PANTRY_SIMULATION_PRODUCT_ID_MAX", &value)?;
        }
        if let Some(value) = read_env("PANTRY_SIMULATION_REVIEW_RATING") {
            self.simulation.review_rating = parse_u8("PANTRY_SIMULATION_REVIEW_RATING", &value)?;
        }
        if let Some(value) = read_env("PANTRY_SIMULATION_REVIEW_COMMENT") {
            self.simulation.review_comment = value;
        }

        let log_level = read_env("PANTRY_LOGGING_LEVEL").or_else(|| read_env("PANTRY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PANTRY_LOGGING_FORMAT").or_else(|| read_env("PANTRY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(seed_products) = overrides.seed_products {
            self.catalog.seed_products = Some(seed_products);
        }
        if let Some(seed_reviews) = overrides.seed_reviews {
            self.catalog.seed_reviews = Some(seed_reviews);
        }
        if let Some(snapshot_path) = overrides.snapshot_path {
            self.catalog.snapshot_path = snapshot_path;
        }
        if let Some(directory) = overrides.reports_directory {
            self.reports.directory = Some(directory);
        }
        if let Some(clients) = overrides.clients {
            self.simulation.clients = clients;
        }
        if let Some(pool_size) = overrides.pool_size {
            self.simulation.pool_size = pool_size;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_simulation(&self.simulation)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("pantry.toml"), PathBuf::from("config/pantry.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.snapshot_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "catalog.snapshot_path must not be empty".to_string(),
        ));
    }

    if catalog.seed_reviews.is_some() && catalog.seed_products.is_none() {
        return Err(ConfigError::Validation(
            "catalog.seed_reviews requires catalog.seed_products to be set".to_string(),
        ));
    }

    Ok(())
}

fn validate_simulation(simulation: &SimulationConfig) -> Result<(), ConfigError> {
    if simulation.clients == 0 {
        return Err(ConfigError::Validation(
            "simulation.clients must be greater than zero".to_string(),
        ));
    }

    if simulation.pool_size == 0 || simulation.pool_size > MAX_POOL_SIZE {
        return Err(ConfigError::Validation(format!(
            "simulation.pool_size must be in range 1..={MAX_POOL_SIZE}"
        )));
    }

    if simulation.product_id_min > simulation.product_id_max {
        return Err(ConfigError::Validation(
            "simulation.product_id_min must not exceed simulation.product_id_max".to_string(),
        ));
    }

    if simulation.review_rating > 5 {
        return Err(ConfigError::Validation(
            "simulation.review_rating must be in range 0..=5".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u8(key: &str, value: &str) -> Result<u8, ConfigError> {
    value.trim().parse::<u8>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    reports: Option<ReportsPatch>,
    simulation: Option<SimulationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    seed_products: Option<PathBuf>,
    seed_reviews: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportsPatch {
    directory: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct SimulationPatch {
    clients: Option<usize>,
    pool_size: Option<usize>,
    product_id_min: Option<u32>,
    product_id_max: Option<u32>,
    review_rating: Option<u8>,
    review_comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
