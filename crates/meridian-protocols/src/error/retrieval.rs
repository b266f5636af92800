//! Retrieval errors.

use thiserror::Error;

/// Errors raised by content-store adapters.
///
/// These are recovered at the adapter boundary: a failed leg contributes
/// zero results and the search as a whole still returns a well-formed
/// result set.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}
