use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::domain::product::{Product, ProductId};
use crate::domain::review::Review;
use crate::errors::ApplicationError;
use crate::locale::Locale;

/// A rendered product report addressed to one client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductReport {
    pub product_id: ProductId,
    pub locale: Locale,
    pub client: String,
    pub text: String,
}

impl ProductReport {
    pub fn file_name(&self) -> String {
        let client: String = self
            .client
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '_' })
            .collect();
        format!("product{}_{}.txt", self.product_id, client)
    }
}

/// Renders the header line followed by one line per review, in history order.
pub fn render_report(product: &Product, reviews: &[Review], locale: Locale) -> String {
    let mut lines = Vec::with_capacity(reviews.len() + 1);

    let mut header = format!(
        "{}, {}, {}, {}, {}",
        product.id(),
        product.name(),
        locale.format_money(product.price()),
        locale.format_money(product.discount()),
        product.rating().stars()
    );
    if let Some(best_before) = product.best_before() {
        header.push_str(", ");
        header.push_str(&locale.format_date(best_before));
    }
    lines.push(header);

    if reviews.is_empty() {
        lines.push(locale.not_reviewed_label().to_string());
    } else {
        lines.extend(
            reviews
                .iter()
                .map(|review| format!("{}\t{}", review.rating().stars(), review.comment())),
        );
    }

    lines.join("\n")
}

pub trait ReportSink: Send + Sync {
    fn emit(&self, report: ProductReport) -> Result<(), ApplicationError>;
}

/// Discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReportSink;

impl ReportSink for NullReportSink {
    fn emit(&self, _report: ProductReport) -> Result<(), ApplicationError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryReportSink {
    reports: Arc<Mutex<Vec<ProductReport>>>,
}

impl InMemoryReportSink {
    pub fn reports(&self) -> Vec<ProductReport> {
        match self.reports.lock() {
            Ok(reports) => reports.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ReportSink for InMemoryReportSink {
    fn emit(&self, report: ProductReport) -> Result<(), ApplicationError> {
        match self.reports.lock() {
            Ok(mut reports) => reports.push(report),
            Err(poisoned) => poisoned.into_inner().push(report),
        }
        Ok(())
    }
}

/// Writes each report to `product{id}_{client}.txt` inside `directory`.
#[derive(Clone, Debug)]
pub struct DirectoryReportSink {
    directory: PathBuf,
}

impl DirectoryReportSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }
}

impl ReportSink for DirectoryReportSink {
    fn emit(&self, report: ProductReport) -> Result<(), ApplicationError> {
        fs::create_dir_all(&self.directory).map_err(|error| {
            ApplicationError::Persistence(format!(
                "could not create report directory `{}`: {error}",
                self.directory.display()
            ))
        })?;

        let path = self.directory.join(report.file_name());
        fs::write(&path, format!("{}\n", report.text)).map_err(|error| {
            ApplicationError::Persistence(format!(
                "could not write report `{}`: {error}",
                path.display()
            ))
        })?;

        debug!(
            event_name = "catalog.report.written",
            product_id = %report.product_id,
            client = %report.client,
            path = %path.display(),
            "product report written"
        );
        Ok(())
    }
}
