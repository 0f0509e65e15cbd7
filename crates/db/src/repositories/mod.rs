use async_trait::async_trait;
use thiserror::Error;

use pantry_core::catalog::CatalogSnapshot;

pub mod file;
pub mod memory;

pub use file::JsonFileSnapshotStore;
pub use memory::InMemorySnapshotStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for pantry_core::errors::ApplicationError {
    fn from(error: RepositoryError) -> Self {
        Self::Persistence(error.to_string())
    }
}

/// Durable home for catalog snapshots used by dump and restore.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<CatalogSnapshot>, RepositoryError>;
    async fn save(&self, snapshot: &CatalogSnapshot) -> Result<(), RepositoryError>;
}
