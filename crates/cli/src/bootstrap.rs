use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use pantry_core::catalog::{LoadSummary, ProductManager};
use pantry_core::config::AppConfig;
use pantry_core::errors::ApplicationError;
use pantry_core::fixtures;
use pantry_core::report::{DirectoryReportSink, InMemoryReportSink, ReportSink};
use pantry_db::{JsonFileSnapshotStore, SnapshotStore};

/// Where the running catalog came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    Snapshot(PathBuf),
    SeedFiles(LoadSummary),
    Demo(LoadSummary),
}

pub struct Catalog {
    pub manager: Arc<ProductManager>,
    /// Set when reports are kept in memory rather than written to a directory.
    pub captured_reports: Option<InMemoryReportSink>,
    pub source: CatalogSource,
}

/// Builds the shared catalog: restored from the configured snapshot when one
/// exists, otherwise seeded from record files or the built-in demo data.
pub async fn open_catalog(config: &AppConfig) -> anyhow::Result<Catalog> {
    let (sink, captured_reports): (Arc<dyn ReportSink>, Option<InMemoryReportSink>) =
        match &config.reports.directory {
            Some(directory) => (Arc::new(DirectoryReportSink::new(directory)), None),
            None => {
                let sink = InMemoryReportSink::default();
                (Arc::new(sink.clone()), Some(sink))
            }
        };

    let store = JsonFileSnapshotStore::new(&config.catalog.snapshot_path);
    if let Some(snapshot) = store.load().await.map_err(ApplicationError::from)? {
        let manager =
            ProductManager::from_snapshot(snapshot, sink).map_err(ApplicationError::from)?;
        let source = CatalogSource::Snapshot(store.path().to_path_buf());
        info!(
            event_name = "catalog.bootstrap.restored",
            path = %store.path().display(),
            "catalog restored from snapshot"
        );
        return Ok(Catalog { manager: Arc::new(manager), captured_reports, source });
    }

    let manager = ProductManager::new(sink);
    let source = match &config.catalog.seed_products {
        Some(products_path) => {
            let summary =
                seed_from_files(&manager, products_path, config.catalog.seed_reviews.as_deref())
                    .await?;
            CatalogSource::SeedFiles(summary)
        }
        None => CatalogSource::Demo(fixtures::seed_demo(&manager)),
    };

    if let CatalogSource::SeedFiles(summary) | CatalogSource::Demo(summary) = &source {
        info!(
            event_name = "catalog.bootstrap.seeded",
            products = summary.products_loaded,
            reviews = summary.reviews_loaded,
            rejected = summary.rejected,
            "catalog seeded"
        );
    }

    Ok(Catalog { manager: Arc::new(manager), captured_reports, source })
}

async fn seed_from_files(
    manager: &ProductManager,
    products_path: &Path,
    reviews_path: Option<&Path>,
) -> anyhow::Result<LoadSummary> {
    let products = tokio::fs::read_to_string(products_path).await.with_context(|| {
        format!("could not read product records from `{}`", products_path.display())
    })?;

    let reviews = match reviews_path {
        Some(path) => tokio::fs::read_to_string(path).await.with_context(|| {
            format!("could not read review records from `{}`", path.display())
        })?,
        None => String::new(),
    };

    Ok(manager.load_records(products.lines(), reviews.lines()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use pantry_core::config::AppConfig;
    use pantry_core::domain::product::ProductId;
    use pantry_core::domain::rating::Rating;
    use pantry_db::{JsonFileSnapshotStore, SnapshotStore};

    use super::{open_catalog, CatalogSource};

    fn config_in(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.catalog.snapshot_path = dir.path().join("snapshot.json");
        config
    }

    #[tokio::test]
    async fn falls_back_to_demo_data() {
        let dir = TempDir::new().expect("temp dir");
        let catalog = open_catalog(&config_in(&dir)).await.expect("open catalog");

        assert!(matches!(catalog.source, CatalogSource::Demo(summary) if summary.rejected == 0));
        assert!(catalog.captured_reports.is_some());
        assert_eq!(catalog.manager.products().len(), 6);
    }

    #[tokio::test]
    async fn seeds_from_record_files() {
        let dir = TempDir::new().expect("temp dir");
        let products = dir.path().join("products.txt");
        let reviews = dir.path().join("reviews.txt");
        fs::write(&products, "D,164,Kombucha,1.99,0\nnot a record\n").expect("write products");
        fs::write(&reviews, "164,4,This is not tea\n164,2,Looks like tea but is it?\n")
            .expect("write reviews");

        let mut config = config_in(&dir);
        config.catalog.seed_products = Some(products);
        config.catalog.seed_reviews = Some(reviews);
        let catalog = open_catalog(&config).await.expect("open catalog");

        let CatalogSource::SeedFiles(summary) = catalog.source else {
            panic!("expected seed file source");
        };
        assert_eq!(summary.products_loaded, 1);
        assert_eq!(summary.reviews_loaded, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(
            catalog.manager.find_product(ProductId(164)).expect("kombucha").rating(),
            Rating::ThreeStar
        );
    }

    #[tokio::test]
    async fn missing_seed_file_is_reported_with_path() {
        let dir = TempDir::new().expect("temp dir");
        let mut config = config_in(&dir);
        config.catalog.seed_products = Some(dir.path().join("absent.txt"));

        let error = open_catalog(&config).await.err().expect("missing file should fail");

        assert!(error.to_string().contains("absent.txt"));
    }

    #[tokio::test]
    async fn existing_snapshot_takes_precedence() {
        let dir = TempDir::new().expect("temp dir");
        let config = config_in(&dir);

        let seeded = open_catalog(&config).await.expect("seed");
        seeded.manager.review_product(ProductId(105), Rating::OneStar, "Cold").expect("review");
        JsonFileSnapshotStore::new(&config.catalog.snapshot_path)
            .save(&seeded.manager.snapshot())
            .await
            .expect("save snapshot");

        let restored = open_catalog(&config).await.expect("restore");

        assert!(matches!(restored.source, CatalogSource::Snapshot(_)));
        assert_eq!(restored.manager.reviews(ProductId(105)).expect("history").len(), 3);
    }
}
