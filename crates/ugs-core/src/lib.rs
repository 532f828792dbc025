//! UGS core
//!
//! Shared building blocks of the UGS CLI services:
//!
//! - **Fetch engine**: loads local resource files, lists the remote side and
//!   partitions every item into created / updated / deleted / unchanged /
//!   errored groups, optionally applying the changes.
//! - **Gateway**: authenticated HTTP client for the Unity services API.
//! - **Environment resolution**: maps the configured environment name to its
//!   identifier before any remote call.
//!
//! # Architecture
//!
//! ```text
//!  local files ──► ResourceLoader ──┐
//!                                   ├──► reconcile ──► FetchResult ──► FetchReport
//!  RemoteStore::list ───────────────┘          │
//!                                              └──► RemoteStore::apply_changes
//! ```

pub mod cancel;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod fetch;
pub mod fetcher;
pub mod gateway;
pub mod item;
pub mod loader;
pub mod store;

pub use cancel::{cancellable, ensure_not_cancelled};
pub use discovery::discover_files;
pub use environment::{EnvironmentInfo, UnityEnvironment};
pub use error::{CoreError, Result};
pub use fetch::{
    ActionResult, ApplyResult, ErrorEntry, FetchInput, FetchReport, FetchResult, FetchSummary,
    NOT_APPLIED_CANCELLED, reconcile,
};
pub use fetcher::{FetchService, Fetcher, StatusReporter};
pub use gateway::{Credentials, DEFAULT_SERVICES_URL, Gateway};
pub use item::{ChangeKind, DeploymentItem, Resource, Severity, Status};
pub use loader::{MAX_CONCURRENT_READS, ResourceLoader, fallback_name, load_all};
pub use store::{EnvironmentResolver, RemoteStore, Target};

// Re-exported so service crates share one token type
pub use tokio_util::sync::CancellationToken;
