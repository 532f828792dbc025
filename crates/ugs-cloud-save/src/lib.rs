//! Cloud Save service for the UGS CLI
//!
//! Manages the query indexes of Cloud Save data.
//!
//! # Features
//!
//! - Index listing and creation (player data with default / public /
//!   protected visibility, custom entity data)
//! - Fetch of `.csi` index definition files against the service
//!
//! # Index files
//!
//! ```json
//! {
//!   "entityType": "player",
//!   "visibility": "public",
//!   "fields": [{ "key": "level", "asc": true }]
//! }
//! ```
//!
//! An index is identified by its entity type, visibility and field keys;
//! changing the sort order of a field updates the index.

pub mod client;
pub mod error;
pub mod fetch;
pub mod input;
pub mod model;

pub use client::CloudSaveClient;
pub use error::{CloudSaveError, Result};
pub use fetch::{CloudSaveFetcher, INDEX_FILE_EXTENSION, IndexLoader, SERVICE_NAME, fetcher};
pub use input::CreateIndexInput;
pub use model::{
    CreateIndexBody, CreateIndexResponse, EntityType, Index, IndexField, IndexInfo, Visibility,
};
