use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced to the user by a load operation.
#[derive(Debug, Error)]
pub enum LoadError {
    /// `deformations` is missing or cannot be listed.
    #[error("Deformations directory not found: {}", .path.display())]
    DirectoryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid indices format. Please use comma-separated numbers ('{token}' is not a number).")]
    InvalidIndicesFormat { token: String },

    /// A collaborator failed part-way through; `executed` instructions ran before it.
    #[error("Error loading data: {cause:#}")]
    UnexpectedLoadError { executed: usize, cause: anyhow::Error },
}

impl LoadError {
    pub fn unexpected(executed: usize, cause: impl Into<anyhow::Error>) -> Self {
        LoadError::UnexpectedLoadError {
            executed,
            cause: cause.into(),
        }
    }
}
