//! Game Server Hosting error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GshError {
    #[error("Invalid server id '{0}': expected a number")]
    InvalidServerId(String),

    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error(transparent)]
    Core(#[from] ugs_core::CoreError),
}

pub type Result<T> = std::result::Result<T, GshError>;
