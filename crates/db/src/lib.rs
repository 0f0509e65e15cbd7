pub mod repositories;

pub use repositories::{
    InMemorySnapshotStore, JsonFileSnapshotStore, RepositoryError, SnapshotStore,
};
