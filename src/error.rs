use thiserror::Error;

/// Failures surfaced by the directory service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Simulated transport failure from the mock backend.
    #[error("{0}")]
    Network(String),
    #[error("Company {0} not found.")]
    NotFound(i64),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for DirectoryError {
    fn from(err: rusqlite::Error) -> Self {
        DirectoryError::Storage(err.into())
    }
}

impl DirectoryError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DirectoryError::Network(_))
    }
}
