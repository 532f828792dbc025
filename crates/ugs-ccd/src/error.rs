//! Cloud Content Delivery error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CcdError {
    #[error("Invalid entry path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] ugs_core::CoreError),
}

pub type Result<T> = std::result::Result<T, CcdError>;
