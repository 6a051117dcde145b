use biblos_store::StoreError;
use thiserror::Error;

/// Failure taxonomy of the catalog engine. Empty pages and empty featured
/// sets are success values, never errors; `NotFound` is reserved for a
/// specific record that does not exist (or is logically deleted).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidArgument(String),

    /// Underlying store unreachable or a write rejected for a reason other
    /// than uniqueness. Single attempt, never retried here.
    #[error("storage failure")]
    Storage(#[from] StoreError),
}

impl CatalogError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
