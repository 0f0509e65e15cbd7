use thiserror::Error;

use crate::domain::product::ProductId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("product {0} not found")]
    NotFound(ProductId),
    #[error("product {0} already exists")]
    DuplicateKey(ProductId),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DomainError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable machine-readable class used in command payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::NotFound(_)) => "not_found",
            Self::Domain(DomainError::DuplicateKey(_)) => "duplicate_key",
            Self::Domain(DomainError::InvalidArgument(_)) => "invalid_argument",
            Self::Persistence(_) => "persistence",
            Self::Configuration(_) => "config_validation",
        }
    }
}
