use tokio::sync::RwLock;

use pantry_core::catalog::CatalogSnapshot;

use super::{RepositoryError, SnapshotStore};

#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshot: RwLock<Option<CatalogSnapshot>>,
}

#[async_trait::async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self) -> Result<Option<CatalogSnapshot>, RepositoryError> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.clone())
    }

    async fn save(&self, snapshot: &CatalogSnapshot) -> Result<(), RepositoryError> {
        let mut stored = self.snapshot.write().await;
        *stored = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use pantry_core::catalog::{NewProduct, ProductManager};
    use pantry_core::domain::product::ProductId;
    use pantry_core::domain::rating::Rating;
    use pantry_core::report::NullReportSink;

    use crate::repositories::{InMemorySnapshotStore, SnapshotStore};

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let store = InMemorySnapshotStore::default();

        assert!(store.load().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn saved_snapshot_restores_catalog() {
        let manager = ProductManager::default();
        manager
            .create_product(NewProduct::drink(101, "Tea", Decimal::new(199, 2), Rating::NotRated))
            .expect("create");
        manager.review_product(ProductId(101), Rating::FourStar, "Fine tea").expect("review");

        let store = InMemorySnapshotStore::default();
        store.save(&manager.snapshot()).await.expect("save snapshot");
        let loaded = store.load().await.expect("load snapshot").expect("snapshot present");

        let restored =
            ProductManager::from_snapshot(loaded, Arc::new(NullReportSink)).expect("restore");
        assert_eq!(restored.products(), manager.products());
        assert_eq!(
            restored.reviews(ProductId(101)).expect("history"),
            manager.reviews(ProductId(101)).expect("history")
        );
    }

    #[tokio::test]
    async fn later_save_replaces_earlier_one() {
        let store = InMemorySnapshotStore::default();
        let manager = ProductManager::default();
        store.save(&manager.snapshot()).await.expect("save empty");

        manager
            .create_product(NewProduct::drink(102, "Coffee", Decimal::new(199, 2), Rating::NotRated))
            .expect("create");
        store.save(&manager.snapshot()).await.expect("save populated");

        let loaded = store.load().await.expect("load").expect("snapshot present");
        assert_eq!(loaded.products.len(), 1);
    }
}
