//! Remote service abstraction

use crate::error::{CoreError, Result};
use crate::fetch::{ApplyResult, FetchResult};
use crate::item::{ChangeKind, Resource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Project and environment a command operates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub project_id: String,
    pub environment_id: String,
}

impl Target {
    pub fn new(project_id: impl Into<String>, environment_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            environment_id: environment_id.into(),
        }
    }
}

/// Resolves the environment identifier commands run against.
///
/// Must be consulted before any remote listing or mutation.
#[async_trait]
pub trait EnvironmentResolver: Send + Sync {
    async fn fetch_identifier(&self, cancel: &CancellationToken) -> Result<String>;
}

/// Remote side of a reconcilable service.
///
/// Implementations list the authoritative remote resources and apply the
/// mutations computed by a non-dry-run fetch.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    type Resource: Resource;

    /// List every remote resource of the target environment
    async fn list(
        &self,
        target: &Target,
        cancel: &CancellationToken,
    ) -> Result<Vec<Self::Resource>>;

    async fn create(
        &self,
        target: &Target,
        resource: &Self::Resource,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Replace `current` with `desired`
    async fn update(
        &self,
        target: &Target,
        desired: &Self::Resource,
        current: &Self::Resource,
        cancel: &CancellationToken,
    ) -> Result<()>;

    async fn delete(
        &self,
        target: &Target,
        resource: &Self::Resource,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Push every change of `result` to the service.
    ///
    /// The default issues one call per item: creations, then updates, then
    /// deletions. Per-item failures are collected. Once `cancel` fires the
    /// remaining items are recorded as not applied and the partial result
    /// is returned.
    async fn apply_changes(
        &self,
        target: &Target,
        result: &FetchResult<Self::Resource>,
        cancel: &CancellationToken,
    ) -> Result<ApplyResult> {
        let mut applied = ApplyResult::new();
        let start = std::time::Instant::now();

        let pending = result
            .created
            .iter()
            .map(|item| (ChangeKind::Created, item))
            .chain(result.updated.iter().map(|item| (ChangeKind::Updated, item)))
            .chain(result.deleted.iter().map(|item| (ChangeKind::Deleted, item)));

        for (kind, item) in pending {
            if applied.cancelled || cancel.is_cancelled() {
                applied.add_cancelled(item.name(), kind);
                continue;
            }
            let outcome = match (kind, item.resource(), item.counterpart()) {
                (ChangeKind::Created, Some(resource), _) => {
                    tracing::info!(item = %item.name(), "Creating remote resource");
                    self.create(target, resource, cancel).await
                }
                (ChangeKind::Updated, Some(desired), Some(current)) => {
                    tracing::info!(item = %item.name(), "Updating remote resource");
                    self.update(target, desired, current, cancel).await
                }
                (ChangeKind::Deleted, Some(resource), _) => {
                    tracing::info!(item = %item.name(), "Deleting remote resource");
                    self.delete(target, resource, cancel).await
                }
                _ => continue,
            };
            match outcome {
                Ok(()) => applied.add_success(item.name(), kind),
                Err(CoreError::Cancelled) => applied.add_cancelled(item.name(), kind),
                Err(e) => applied.add_failure(item.name(), kind, e.to_string()),
            }
        }

        applied.duration_ms = start.elapsed().as_millis() as u64;
        Ok(applied)
    }
}
