//! Cloud Content Delivery management API client

use crate::model::{Bucket, CcdEntry, Entry, EntryRequest};
use async_trait::async_trait;
use reqwest::Method;
use std::path::Path;
use std::sync::OnceLock;
use ugs_core::{CancellationToken, CoreError, Gateway, RemoteStore, Result, Target};

/// Page size used when listing buckets and entries
pub const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct CcdClient {
    gateway: Gateway,
}

impl CcdClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    fn buckets_path(target: &Target) -> String {
        format!(
            "/ccd/management/v1/projects/{}/environments/{}/buckets",
            target.project_id, target.environment_id
        )
    }

    fn bucket_path(target: &Target, bucket_id: &str) -> String {
        format!("{}/{}", Self::buckets_path(target), bucket_id)
    }

    async fn list_pages<T>(&self, path: &str, cancel: &CancellationToken) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut items = Vec::new();
        for page in 1.. {
            let query = [
                ("page", page.to_string()),
                ("per_page", PAGE_SIZE.to_string()),
            ];
            let batch: Vec<T> = self
                .gateway
                .get_json_with_query(path, &query, cancel)
                .await?;
            let done = batch.len() < PAGE_SIZE;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(items)
    }

    pub async fn list_buckets(
        &self,
        target: &Target,
        cancel: &CancellationToken,
    ) -> Result<Vec<Bucket>> {
        self.list_pages(&Self::buckets_path(target), cancel).await
    }

    /// Identifier of the bucket called `name`
    pub async fn bucket_id_by_name(
        &self,
        target: &Target,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let buckets = self.list_buckets(target, cancel).await?;
        buckets
            .into_iter()
            .find(|b| b.name == name)
            .map(|b| b.id)
            .ok_or_else(|| CoreError::NotFound(format!("bucket '{}'", name)))
    }

    pub async fn list_entries(
        &self,
        target: &Target,
        bucket_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Entry>> {
        let path = format!("{}/entries", Self::bucket_path(target, bucket_id));
        self.list_pages(&path, cancel).await
    }

    pub async fn create_entry(
        &self,
        target: &Target,
        bucket_id: &str,
        request: &EntryRequest,
        cancel: &CancellationToken,
    ) -> Result<Entry> {
        let path = format!("{}/entries", Self::bucket_path(target, bucket_id));
        self.gateway
            .send_json(Method::POST, &path, request, cancel)
            .await
    }

    pub async fn update_entry_by_path(
        &self,
        target: &Target,
        bucket_id: &str,
        request: &EntryRequest,
        cancel: &CancellationToken,
    ) -> Result<Entry> {
        let path = format!("{}/entry_by_path/", Self::bucket_path(target, bucket_id));
        self.gateway
            .send_json_with_query(
                Method::PUT,
                &path,
                &[("path", request.path.as_str())],
                request,
                cancel,
            )
            .await
    }

    pub async fn delete_entry(
        &self,
        target: &Target,
        bucket_id: &str,
        entry_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let path = format!("{}/entries/{}", Self::bucket_path(target, bucket_id), entry_id);
        self.gateway
            .send_empty::<()>(Method::DELETE, &path, None, cancel)
            .await
    }

    /// Stream the content of the entry at `entry_path` into `dest`.
    ///
    /// Resolves the bucket by name first; a missing bucket or entry is a
    /// not-found error.
    pub async fn download_entry(
        &self,
        target: &Target,
        bucket_name: &str,
        entry_path: &str,
        version_id: Option<&str>,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let bucket_id = self.bucket_id_by_name(target, bucket_name, cancel).await?;
        let path = format!("{}/entry_by_path/content/", Self::bucket_path(target, &bucket_id));

        let mut query = vec![("path", entry_path)];
        if let Some(version_id) = version_id {
            query.push(("versionid", version_id));
        }

        tracing::info!(bucket = bucket_name, entry = entry_path, "Downloading entry");
        self.gateway.download(&path, &query, dest, cancel).await
    }

    async fn upload(&self, entry: &Entry, local: &CcdEntry, cancel: &CancellationToken) -> Result<()> {
        let source = local.source.as_deref().ok_or_else(|| {
            CoreError::InvalidInput(format!("entry '{}' has no local content", local.path))
        })?;
        let url = entry.signed_url.as_deref().ok_or_else(|| {
            CoreError::Unsupported(format!("no upload URL returned for '{}'", local.path))
        })?;
        let bytes = tokio::fs::read(source).await?;
        self.gateway
            .put_signed(url, bytes, &local.content_type, cancel)
            .await
    }
}

/// Entries of one bucket, resolved by name on first use
#[derive(Debug)]
pub struct BucketStore {
    client: CcdClient,
    bucket_name: String,
    bucket_id: OnceLock<String>,
}

impl BucketStore {
    pub fn new(client: CcdClient, bucket_name: impl Into<String>) -> Self {
        Self {
            client,
            bucket_name: bucket_name.into(),
            bucket_id: OnceLock::new(),
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    async fn bucket_id(&self, target: &Target, cancel: &CancellationToken) -> Result<String> {
        if let Some(id) = self.bucket_id.get() {
            return Ok(id.clone());
        }
        let id = self
            .client
            .bucket_id_by_name(target, &self.bucket_name, cancel)
            .await?;
        Ok(self.bucket_id.get_or_init(|| id).clone())
    }
}

#[async_trait]
impl RemoteStore for BucketStore {
    type Resource = CcdEntry;

    async fn list(&self, target: &Target, cancel: &CancellationToken) -> Result<Vec<CcdEntry>> {
        let bucket_id = self.bucket_id(target, cancel).await?;
        let entries = self.client.list_entries(target, &bucket_id, cancel).await?;
        Ok(entries.into_iter().map(CcdEntry::from).collect())
    }

    async fn create(
        &self,
        target: &Target,
        resource: &CcdEntry,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let bucket_id = self.bucket_id(target, cancel).await?;
        let entry = self
            .client
            .create_entry(target, &bucket_id, &resource.request(), cancel)
            .await?;
        self.client.upload(&entry, resource, cancel).await
    }

    async fn update(
        &self,
        target: &Target,
        desired: &CcdEntry,
        _current: &CcdEntry,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let bucket_id = self.bucket_id(target, cancel).await?;
        let entry = self
            .client
            .update_entry_by_path(target, &bucket_id, &desired.request(), cancel)
            .await?;
        self.client.upload(&entry, desired, cancel).await
    }

    async fn delete(
        &self,
        target: &Target,
        resource: &CcdEntry,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let entry_id = resource.entryid.as_deref().ok_or_else(|| {
            CoreError::Unsupported(format!("entry '{}' has no identifier", resource.path))
        })?;
        let bucket_id = self.bucket_id(target, cancel).await?;
        self.client
            .delete_entry(target, &bucket_id, entry_id, cancel)
            .await
    }
}
