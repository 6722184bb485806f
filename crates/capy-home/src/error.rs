//! Error types for capy-home

/// Persisted state errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by the coordinator handle
#[derive(Debug, thiserror::Error)]
pub enum HomeError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Coordinator is no longer running")]
    CoordinatorClosed,
}
