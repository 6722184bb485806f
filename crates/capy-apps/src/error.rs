//! Error types for capy-apps

#[derive(Debug, thiserror::Error)]
pub enum AppsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}
