use thiserror::Error;

/// Errors that can occur during document store operations
#[derive(Debug, Error)]
pub enum DocStoreError {
    /// Failed to reach or authenticate with the backing store
    #[error("Store backend error: {0}")]
    Backend(String),

    /// Failed to search the store
    #[error("Failed to search: {0}")]
    SearchFailed(String),

    /// Malformed filter predicate
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocStoreError>;
