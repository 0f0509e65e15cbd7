pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fixtures;
pub mod locale;
pub mod records;
pub mod report;

pub use catalog::{CatalogSnapshot, LoadSummary, NewProduct, ProductHistory, ProductManager};
pub use domain::product::{Product, ProductId, ProductKind, DISCOUNT_RATE};
pub use domain::rating::Rating;
pub use domain::review::Review;
pub use errors::{ApplicationError, DomainError};
pub use locale::{Locale, SUPPORTED_LOCALES};
pub use report::{
    DirectoryReportSink, InMemoryReportSink, NullReportSink, ProductReport, ReportSink,
};
