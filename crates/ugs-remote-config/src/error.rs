//! Remote Config error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteConfigError {
    #[error("Key '{key}' is declared as {declared} but its value is {actual}")]
    TypeMismatch {
        key: String,
        declared: String,
        actual: String,
    },

    #[error("Unknown type '{0}'. Valid types are: STRING, INT, FLOAT, BOOL, LONG, JSON")]
    UnknownType(String),

    #[error("Invalid config file: {0}")]
    InvalidFile(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] ugs_core::CoreError),
}

pub type Result<T> = std::result::Result<T, RemoteConfigError>;
