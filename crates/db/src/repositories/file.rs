use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use pantry_core::catalog::CatalogSnapshot;

use super::{RepositoryError, SnapshotStore};

/// Stores one snapshot as pretty-printed JSON. Saves go through a sibling
/// temporary file and a rename so readers never see a partial document.
#[derive(Clone, Debug)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

#[async_trait::async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn load(&self) -> Result<Option<CatalogSnapshot>, RepositoryError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let snapshot = serde_json::from_slice::<CatalogSnapshot>(&raw)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        debug!(
            event_name = "snapshot.file.loaded",
            path = %self.path.display(),
            products = snapshot.products.len(),
            "snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &CatalogSnapshot) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let encoded = serde_json::to_vec_pretty(snapshot)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let staging = self.staging_path();
        fs::write(&staging, encoded).await?;
        fs::rename(&staging, &self.path).await?;

        debug!(
            event_name = "snapshot.file.saved",
            path = %self.path.display(),
            products = snapshot.products.len(),
            reviews = snapshot.review_count(),
            "snapshot saved"
        );
        Ok(())
    }
}
