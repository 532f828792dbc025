//! Cloud Content Delivery support for the UGS CLI
//!
//! - Bucket and entry listing
//! - Entry download, streamed to disk
//! - Fetch of a local content directory against a bucket: entries are keyed
//!   by their path relative to the directory and compared by MD5 hash and
//!   size

pub mod client;
pub mod error;
pub mod fetch;
pub mod model;

pub use client::{BucketStore, CcdClient, PAGE_SIZE};
pub use error::{CcdError, Result};
pub use fetch::{CcdFetcher, ContentLoader, EXCLUDED_EXTENSIONS, SERVICE_NAME, fetcher};
pub use model::{Bucket, CcdEntry, Entry};
