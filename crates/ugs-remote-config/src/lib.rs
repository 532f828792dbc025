//! Remote Config service for the UGS CLI
//!
//! Reads `.rc` files and reconciles their keys against the settings config
//! of an environment.
//!
//! ```json
//! {
//!   "entries": { "lives": 3, "difficulty": "hard" },
//!   "types": { "lives": "INT" }
//! }
//! ```
//!
//! Keys without a declared type get one inferred from their value. All
//! settings of an environment are stored in a single config document, so
//! applying a fetch writes that document once.

pub mod client;
pub mod error;
pub mod fetch;
pub mod model;

pub use client::RemoteConfigClient;
pub use error::{RemoteConfigError, Result};
pub use fetch::{CONFIG_FILE_EXTENSION, RcLoader, RemoteConfigFetcher, SERVICE_NAME, fetcher};
pub use model::{ConfigEntry, ConfigType, RcFile, SettingsConfig};
