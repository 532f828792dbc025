//! Fetch pipeline: load local files, list remote resources, diff, apply

use crate::cancel::{cancellable, ensure_not_cancelled};
use crate::discovery::{discover_files, has_extension};
use crate::error::Result;
use crate::fetch::{FetchInput, FetchReport, FetchResult, reconcile};
use crate::loader::{ResourceLoader, load_all};
use crate::store::{RemoteStore, Target};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Receives progress messages while a fetch runs
pub trait StatusReporter: Send + Sync {
    fn status(&self, message: &str);
}

impl StatusReporter for () {
    fn status(&self, _message: &str) {}
}

/// Type-erased fetch entry point, one per service
#[async_trait]
pub trait FetchService: Send + Sync {
    /// Display name of the service (e.g. "Remote Config")
    fn service_name(&self) -> &str;

    /// Extensions of the files the service reads; empty means every file
    fn file_extensions(&self) -> &[&'static str];

    async fn fetch_report(
        &self,
        input: &FetchInput,
        target: &Target,
        status: &dyn StatusReporter,
        cancel: &CancellationToken,
    ) -> Result<FetchReport>;
}

/// Generic fetch engine pairing a loader with a remote store
pub struct Fetcher<L, S> {
    service: String,
    extensions: Vec<&'static str>,
    excluded: Vec<&'static str>,
    loader: L,
    store: S,
}

impl<L, S> Fetcher<L, S>
where
    L: ResourceLoader,
    S: RemoteStore<Resource = L::Resource>,
{
    pub fn new(
        service: impl Into<String>,
        extensions: Vec<&'static str>,
        loader: L,
        store: S,
    ) -> Self {
        Self {
            service: service.into(),
            extensions,
            excluded: Vec::new(),
            loader,
            store,
        }
    }

    /// Skip discovered files with one of these extensions
    pub fn excluding(mut self, extensions: Vec<&'static str>) -> Self {
        self.excluded = extensions;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the fetch over an explicit list of files
    #[tracing::instrument(skip_all, fields(service = %self.service, files = files.len()))]
    pub async fn fetch(
        &self,
        input: &FetchInput,
        files: &[PathBuf],
        target: &Target,
        status: &dyn StatusReporter,
        cancel: &CancellationToken,
    ) -> Result<FetchResult<L::Resource>> {
        status.status(&format!("Reading {} files...", self.service));
        let local = load_all(&self.loader, files, cancel).await?;

        ensure_not_cancelled(cancel)?;
        status.status(&format!("Fetching {} files...", self.service));
        let remote = cancellable(cancel, self.store.list(target, cancel)).await?;
        tracing::debug!(local = local.len(), remote = remote.len(), "Listed resources");

        let mut result = reconcile(local, remote, input.reconcile, input.dry_run);

        if input.dry_run || !result.has_changes() {
            return Ok(result);
        }

        ensure_not_cancelled(cancel)?;
        status.status(&format!("Applying {} changes...", self.service));
        let applied = self.store.apply_changes(target, &result, cancel).await?;
        if applied.cancelled {
            tracing::warn!(
                applied = applied.succeeded.len(),
                "{} fetch cancelled before every change was applied",
                self.service
            );
        } else if !applied.is_success() {
            tracing::warn!(
                failed = applied.failed.len(),
                "Some {} changes could not be applied",
                self.service
            );
        }
        result.mark_failed(&applied.failed);

        Ok(result)
    }
}

#[async_trait]
impl<L, S> FetchService for Fetcher<L, S>
where
    L: ResourceLoader,
    S: RemoteStore<Resource = L::Resource>,
{
    fn service_name(&self) -> &str {
        &self.service
    }

    fn file_extensions(&self) -> &[&'static str] {
        &self.extensions
    }

    async fn fetch_report(
        &self,
        input: &FetchInput,
        target: &Target,
        status: &dyn StatusReporter,
        cancel: &CancellationToken,
    ) -> Result<FetchReport> {
        let mut files = discover_files(&input.path, &self.extensions)?;
        if !self.excluded.is_empty() {
            files.retain(|file| !has_extension(file, &self.excluded));
        }
        let result = self.fetch(input, &files, target, status, cancel).await?;
        tracing::info!(summary = %result.summary(), "{} fetch finished", self.service);
        Ok(result.report(self.service.clone()))
    }
}
