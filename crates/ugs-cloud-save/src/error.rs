//! Cloud Save error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudSaveError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid index definition: {0}")]
    InvalidIndex(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] ugs_core::CoreError),
}

impl CloudSaveError {
    /// Whether the error is a user input problem rather than a service failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CloudSaveError::InvalidInput(_) | CloudSaveError::InvalidIndex(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CloudSaveError>;
