//! The shared, concurrently accessed product catalog.
//!
//! Every product owns one entry guarded by its own mutex. The entry holds the
//! current [`Product`] snapshot together with its review history, so a review
//! appends, re-averages and swaps the snapshot inside a single critical
//! section. The index lock only guards the id-to-entry map; it is released
//! before any entry lock is taken and no path holds two entry locks at once.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::product::{Product, ProductId, ProductKind};
use crate::domain::rating::Rating;
use crate::domain::review::Review;
use crate::errors::{ApplicationError, DomainError};
use crate::locale::{Locale, SUPPORTED_LOCALES};
use crate::records::{parse_product_record, parse_review_record};
use crate::report::{render_report, NullReportSink, ProductReport, ReportSink};

/// Input for [`ProductManager::create_product`]. A `best_before` date makes
/// the product perishable food, otherwise it is a drink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub rating: Rating,
    pub best_before: Option<NaiveDate>,
}

impl NewProduct {
    pub fn drink(id: u32, name: impl Into<String>, price: Decimal, rating: Rating) -> Self {
        Self { id: ProductId(id), name: name.into(), price, rating, best_before: None }
    }

    pub fn food(
        id: u32,
        name: impl Into<String>,
        price: Decimal,
        rating: Rating,
        best_before: NaiveDate,
    ) -> Self {
        Self { id: ProductId(id), name: name.into(), price, rating, best_before: Some(best_before) }
    }

    fn into_product(self) -> Result<Product, DomainError> {
        let kind = match self.best_before {
            Some(best_before) => ProductKind::Food { best_before },
            None => ProductKind::Drink,
        };
        Product::new(self.id, self.name, self.price, self.rating, kind)
    }
}

/// One product with its full review history, as stored in a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductHistory {
    pub product: Product,
    pub reviews: Vec<Review>,
}

/// Serializable point-in-time copy of the catalog, ordered by product id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub products: Vec<ProductHistory>,
}

impl CatalogSnapshot {
    pub fn review_count(&self) -> usize {
        self.products.iter().map(|history| history.reviews.len()).sum()
    }
}

/// Outcome of [`ProductManager::load_records`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub products_loaded: usize,
    pub reviews_loaded: usize,
    pub rejected: usize,
}

#[derive(Debug)]
struct CatalogEntry {
    product: Product,
    reviews: Vec<Review>,
}

impl CatalogEntry {
    fn new(product: Product) -> Self {
        Self { product, reviews: Vec::new() }
    }

    /// Appends `review`, re-averages over the whole history and swaps in the
    /// re-rated snapshot. Callers must hold the entry lock.
    fn append(&mut self, review: Review) -> Product {
        self.reviews.push(review);
        if let Some(rating) = Rating::average(self.reviews.iter().map(Review::rating)) {
            self.product = self.product.with_rating(rating);
        }
        self.product.clone()
    }
}

type EntryHandle = Arc<Mutex<CatalogEntry>>;

pub struct ProductManager {
    entries: RwLock<HashMap<ProductId, EntryHandle>>,
    reports: Arc<dyn ReportSink>,
}

impl Default for ProductManager {
    fn default() -> Self {
        Self::new(Arc::new(NullReportSink))
    }
}

impl std::fmt::Debug for ProductManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductManager").field("products", &self.read_index().len()).finish()
    }
}

impl ProductManager {
    pub fn new(reports: Arc<dyn ReportSink>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), reports }
    }

    /// Rebuilds a catalog from `snapshot`. Ratings are recomputed from the
    /// restored review histories.
    pub fn from_snapshot(
        snapshot: CatalogSnapshot,
        reports: Arc<dyn ReportSink>,
    ) -> Result<Self, DomainError> {
        let manager = Self::new(reports);
        for ProductHistory { product, reviews } in snapshot.products {
            let id = product.id();
            if let Some(stray) = reviews.iter().find(|review| review.product_id() != id) {
                return Err(DomainError::invalid_argument(format!(
                    "snapshot lists a review for product {} under product {id}",
                    stray.product_id()
                )));
            }

            let mut entry = CatalogEntry::new(product);
            for review in reviews {
                entry.append(review);
            }
            match manager.write_index().entry(id) {
                Entry::Occupied(_) => return Err(DomainError::DuplicateKey(id)),
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(Mutex::new(entry)));
                }
            }
        }
        Ok(manager)
    }

    pub fn supported_locales() -> &'static [&'static str] {
        &SUPPORTED_LOCALES
    }

    pub fn create_product(&self, new_product: NewProduct) -> Result<Product, DomainError> {
        let product = new_product.into_product()?;
        let id = product.id();

        match self.write_index().entry(id) {
            Entry::Occupied(_) => {
                warn!(
                    event_name = "catalog.product.duplicate",
                    product_id = %id,
                    "product already exists; catalog unchanged"
                );
                Err(DomainError::DuplicateKey(id))
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(CatalogEntry::new(product.clone()))));
                debug!(event_name = "catalog.product.created", product_id = %id, "product created");
                Ok(product)
            }
        }
    }

    /// Records a review and returns the re-rated product.
    pub fn review_product(
        &self,
        id: ProductId,
        rating: Rating,
        comment: impl Into<String>,
    ) -> Result<Product, DomainError> {
        self.submit_review(Review::new(id, rating, comment))
    }

    fn submit_review(&self, review: Review) -> Result<Product, DomainError> {
        let id = review.product_id();
        let entry = match self.entry(id) {
            Ok(entry) => entry,
            Err(error) => {
                warn!(
                    event_name = "catalog.review.rejected",
                    product_id = %id,
                    "review discarded for unknown product"
                );
                return Err(error);
            }
        };

        let updated = lock_entry(&entry).append(review);
        debug!(
            event_name = "catalog.review.accepted",
            product_id = %id,
            rating = updated.rating().star_count(),
            "review recorded"
        );
        Ok(updated)
    }

    pub fn find_product(&self, id: ProductId) -> Result<Product, DomainError> {
        let entry = self.entry(id)?;
        let product = lock_entry(&entry).product.clone();
        Ok(product)
    }

    pub fn reviews(&self, id: ProductId) -> Result<Vec<Review>, DomainError> {
        let entry = self.entry(id)?;
        let reviews = lock_entry(&entry).reviews.clone();
        Ok(reviews)
    }

    /// Current products ordered by id.
    pub fn products(&self) -> Vec<Product> {
        self.handles().iter().map(|entry| lock_entry(entry).product.clone()).collect()
    }

    /// Sum of product discounts per rating, formatted for `locale`. Each
    /// product is read under its own lock.
    pub fn discounts(&self, locale: Locale) -> BTreeMap<Rating, String> {
        let mut totals: BTreeMap<Rating, Decimal> = BTreeMap::new();
        for entry in self.handles() {
            let product = lock_entry(&entry).product.clone();
            *totals.entry(product.rating()).or_default() += product.discount();
        }

        totals.into_iter().map(|(rating, total)| (rating, locale.format_money(total))).collect()
    }

    pub fn product_report(&self, id: ProductId, locale: Locale) -> Result<String, DomainError> {
        let entry = self.entry(id)?;
        let (product, reviews) = {
            let guard = lock_entry(&entry);
            (guard.product.clone(), guard.reviews.clone())
        };
        Ok(render_report(&product, &reviews, locale))
    }

    /// Renders the report for `id` and hands it to the report sink tagged
    /// with `client`.
    pub fn print_product_report(
        &self,
        id: ProductId,
        locale: Locale,
        client: &str,
    ) -> Result<(), ApplicationError> {
        let text = match self.product_report(id, locale) {
            Ok(text) => text,
            Err(error) => {
                warn!(
                    event_name = "catalog.report.product_missing",
                    product_id = %id,
                    client = %client,
                    "report requested for unknown product"
                );
                return Err(error.into());
            }
        };

        self.reports.emit(ProductReport {
            product_id: id,
            locale,
            client: client.to_string(),
            text,
        })
    }

    pub fn parse_product(&self, record: &str) -> Result<Product, DomainError> {
        self.create_product(parse_product_record(record)?)
    }

    pub fn parse_review(&self, record: &str) -> Result<Product, DomainError> {
        self.submit_review(parse_review_record(record)?)
    }

    /// Creates every product record, then applies every review record.
    /// Rejected records are logged and counted, never fatal.
    pub fn load_records<'a, P, R>(&self, products: P, reviews: R) -> LoadSummary
    where
        P: IntoIterator<Item = &'a str>,
        R: IntoIterator<Item = &'a str>,
    {
        let mut summary = LoadSummary::default();

        for record in products.into_iter().filter(|record| !record.trim().is_empty()) {
            match self.parse_product(record) {
                Ok(_) => summary.products_loaded += 1,
                Err(error) => {
                    warn!(
                        event_name = "catalog.load.product_rejected",
                        record,
                        %error,
                        "record skipped"
                    );
                    summary.rejected += 1;
                }
            }
        }

        for record in reviews.into_iter().filter(|record| !record.trim().is_empty()) {
            match self.parse_review(record) {
                Ok(_) => summary.reviews_loaded += 1,
                Err(error) => {
                    warn!(
                        event_name = "catalog.load.review_rejected",
                        record,
                        %error,
                        "record skipped"
                    );
                    summary.rejected += 1;
                }
            }
        }

        summary
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        let products = self
            .handles()
            .iter()
            .map(|entry| {
                let guard = lock_entry(entry);
                ProductHistory { product: guard.product.clone(), reviews: guard.reviews.clone() }
            })
            .collect();
        CatalogSnapshot { products }
    }

    fn entry(&self, id: ProductId) -> Result<EntryHandle, DomainError> {
        self.read_index().get(&id).cloned().ok_or(DomainError::NotFound(id))
    }

    /// Entry handles ordered by id, copied out so the index lock is released
    /// before any entry is locked.
    fn handles(&self) -> Vec<EntryHandle> {
        let index = self.read_index();
        let mut ids: Vec<&ProductId> = index.keys().collect();
        ids.sort();
        ids.into_iter().filter_map(|id| index.get(id).cloned()).collect()
    }

    fn read_index(&self) -> RwLockReadGuard<'_, HashMap<ProductId, EntryHandle>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_index(&self) -> RwLockWriteGuard<'_, HashMap<ProductId, EntryHandle>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_entry(entry: &Mutex<CatalogEntry>) -> MutexGuard<'_, CatalogEntry> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}
