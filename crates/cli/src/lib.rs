pub mod bootstrap;
pub mod commands;
pub mod driver;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use pantry_core::config::{AppConfig, ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "pantry",
    about = "Pantry catalog operator CLI",
    long_about = "Run the concurrent shop simulation, render localized product reports, and dump or restore catalog snapshots.",
    after_help = "Examples:\n  pantry simulate\n  pantry report --id 101 --locale fr-FR\n  pantry discounts --locale en-US\n  pantry dump --path catalog.json\n  pantry --snapshot shop.json --reports-dir reports simulate --save"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a pantry.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override logging.level")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Override catalog.seed_products")]
    seed_products: Option<PathBuf>,
    #[arg(long, global = true, help = "Override catalog.seed_reviews")]
    seed_reviews: Option<PathBuf>,
    #[arg(long, global = true, help = "Override catalog.snapshot_path")]
    snapshot: Option<PathBuf>,
    #[arg(long, global = true, help = "Override reports.directory")]
    reports_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run concurrent clients against the shared catalog and print their logs")]
    Simulate {
        #[arg(long, help = "Override simulation.clients")]
        clients: Option<usize>,
        #[arg(long, help = "Override simulation.pool_size")]
        pool_size: Option<usize>,
        #[arg(long, help = "Write the catalog to the snapshot path afterwards")]
        save: bool,
    },
    #[command(about = "Render the report for one product")]
    Report {
        #[arg(long)]
        id: u32,
        #[arg(long, default_value = "en-GB")]
        locale: String,
    },
    #[command(about = "List summed discounts per rating")]
    Discounts {
        #[arg(long, default_value = "en-GB")]
        locale: String,
    },
    #[command(about = "List supported locale tags")]
    Locales,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Write the catalog to a JSON snapshot")]
    Dump {
        #[arg(long)]
        path: Option<PathBuf>,
    },
    #[command(about = "Validate a JSON snapshot and install it as the active catalog")]
    Restore {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let mut options = LoadOptions {
        config_path: cli.config,
        require_file: false,
        overrides: ConfigOverrides {
            seed_products: cli.seed_products,
            seed_reviews: cli.seed_reviews,
            snapshot_path: cli.snapshot,
            reports_directory: cli.reports_dir,
            log_level: cli.log_level,
            ..ConfigOverrides::default()
        },
    };

    let logging = AppConfig::load(options.clone())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    logging::init(&logging);

    let result = match cli.command {
        Command::Simulate { clients, pool_size, save } => {
            options.overrides.clients = clients;
            options.overrides.pool_size = pool_size;
            commands::simulate::run(options, save)
        }
        Command::Report { id, locale } => commands::report::run(options, id, &locale),
        Command::Discounts { locale } => commands::discounts::run(options, &locale),
        Command::Locales => commands::locales::run(),
        Command::Config => commands::config::run(options),
        Command::Dump { path } => commands::dump::dump(options, path),
        Command::Restore { path } => commands::dump::restore(options, path),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
