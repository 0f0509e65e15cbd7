//! Concurrent shop simulation: a fixed number of clients share one catalog
//! through a bounded worker pool.

use std::fmt::Write as _;
use std::sync::Arc;

use rand::Rng;
use tokio::sync::Semaphore;
use tracing::{error, info};

use pantry_core::catalog::ProductManager;
use pantry_core::config::SimulationConfig;
use pantry_core::domain::product::ProductId;
use pantry_core::domain::rating::Rating;
use pantry_core::errors::DomainError;
use pantry_core::locale::Locale;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationSettings {
    pub clients: usize,
    pub pool_size: usize,
    pub product_id_min: u32,
    pub product_id_max: u32,
    pub review_rating: Rating,
    pub review_comment: String,
}

impl SimulationSettings {
    pub fn from_config(config: &SimulationConfig) -> Result<Self, DomainError> {
        if config.clients == 0 || config.pool_size == 0 {
            return Err(DomainError::invalid_argument(
                "simulation needs at least one client and one worker",
            ));
        }
        if config.product_id_min > config.product_id_max {
            return Err(DomainError::invalid_argument(format!(
                "empty product id range {}..={}",
                config.product_id_min, config.product_id_max
            )));
        }

        Ok(Self {
            clients: config.clients,
            pool_size: config.pool_size,
            product_id_min: config.product_id_min,
            product_id_max: config.product_id_max,
            review_rating: Rating::from_stars(config.review_rating)?,
            review_comment: config.review_comment.clone(),
        })
    }
}

/// Everything one client did, as text plus the facts tests care about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientLog {
    pub client: String,
    pub product_id: ProductId,
    pub locale: Locale,
    pub reviewed: bool,
    pub reported: bool,
    pub text: String,
}

#[derive(Clone, Debug, Default)]
pub struct SimulationOutcome {
    /// Logs in submission order, one per client that ran to completion.
    pub logs: Vec<ClientLog>,
    pub failed_clients: usize,
}

/// Spawns `settings.clients` client tasks and waits for all of them. At most
/// `settings.pool_size` clients run at once; the rest queue on the semaphore.
pub async fn run_clients(
    manager: Arc<ProductManager>,
    settings: Arc<SimulationSettings>,
) -> SimulationOutcome {
    let permits = Arc::new(Semaphore::new(settings.pool_size));
    let mut handles = Vec::with_capacity(settings.clients);

    for number in 1..=settings.clients {
        let client = format!("Client {number}");
        let manager = Arc::clone(&manager);
        let settings = Arc::clone(&settings);
        let permits = Arc::clone(&permits);
        let task_client = client.clone();

        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            Ok::<_, tokio::sync::AcquireError>(serve_client(&manager, &settings, task_client))
        });
        handles.push((client, handle));
    }

    let mut outcome = SimulationOutcome::default();
    for (client, handle) in handles {
        match handle.await {
            Ok(Ok(log)) => outcome.logs.push(log),
            Ok(Err(acquire)) => {
                error!(
                    event_name = "simulation.client.failed",
                    client = %client,
                    error = %acquire,
                    "client could not obtain a worker"
                );
                outcome.failed_clients += 1;
            }
            Err(join) => {
                error!(
                    event_name = "simulation.client.failed",
                    client = %client,
                    error = %join,
                    "error retrieving client log"
                );
                outcome.failed_clients += 1;
            }
        }
    }

    info!(
        event_name = "simulation.finished",
        clients = settings.clients,
        completed = outcome.logs.len(),
        failed = outcome.failed_clients,
        "simulation finished"
    );
    outcome
}

/// One client's read-then-write sequence against the shared catalog.
fn serve_client(
    manager: &ProductManager,
    settings: &SimulationSettings,
    client: String,
) -> ClientLog {
    let (product_id, locale) = {
        let mut rng = rand::thread_rng();
        let id = rng.gen_range(settings.product_id_min..=settings.product_id_max);
        let locale = Locale::ALL[rng.gen_range(0..Locale::ALL.len())];
        (ProductId(id), locale)
    };
    let thread = std::thread::current().name().unwrap_or("unnamed").to_string();

    let mut text = format!("{client} {thread}\n-\tstart of log\t-\n");
    let discounts: Vec<String> = manager
        .discounts(locale)
        .into_iter()
        .map(|(rating, amount)| format!("{}\t{amount}", rating.stars()))
        .collect();
    text.push_str(&discounts.join("\n"));

    let reviewed = manager
        .review_product(product_id, settings.review_rating, settings.review_comment.as_str())
        .is_ok();
    let verdict = if reviewed { "reviewed" } else { "not reviewed" };
    let _ = write!(text, "\nProduct {product_id} {verdict}\n");

    let reported = match manager.print_product_report(product_id, locale, &client) {
        Ok(()) => {
            let _ = write!(text, "{client} generated report for {product_id} product");
            true
        }
        Err(report_error) => {
            let _ = write!(text, "{client} could not generate report for {product_id} product");
            if report_error.error_class() != "not_found" {
                error!(
                    event_name = "simulation.client.report_failed",
                    client = %client,
                    product_id = %product_id,
                    error = %report_error,
                    "report sink rejected report"
                );
            }
            false
        }
    };
    text.push_str("\n-\tend of log\t-\n");

    ClientLog { client, product_id, locale, reviewed, reported, text }
}
