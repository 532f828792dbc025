//! Local content files and the CCD fetch service

use crate::client::{BucketStore, CcdClient};
use crate::error::{CcdError, Result};
use crate::model::{CcdEntry, content_type_for};
use async_trait::async_trait;
use md5::{Digest, Md5};
use std::path::{Component, Path, PathBuf};
use ugs_core::{DeploymentItem, Fetcher, Gateway, ResourceLoader, fallback_name};

pub const SERVICE_NAME: &str = "Cloud Content Delivery";

/// Turns every file under `root` into a bucket entry keyed by its relative path
#[derive(Debug, Clone)]
pub struct ContentLoader {
    root: PathBuf,
}

impl ContentLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Entry path of `path`: relative to the root, `/`-separated
    pub fn entry_path(&self, path: &Path) -> Result<String> {
        let relative = if path == self.root {
            Path::new(path.file_name().unwrap_or_default())
        } else {
            path.strip_prefix(&self.root)
                .map_err(|_| CcdError::InvalidPath(path.display().to_string()))?
        };

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                _ => return Err(CcdError::InvalidPath(path.display().to_string())),
            }
        }
        if parts.is_empty() {
            return Err(CcdError::InvalidPath(path.display().to_string()));
        }
        Ok(parts.join("/"))
    }

    async fn read_entry(&self, path: &Path) -> Result<CcdEntry> {
        let entry_path = self.entry_path(path)?;
        let bytes = tokio::fs::read(path).await?;
        let content_hash = hex::encode(Md5::digest(&bytes));

        Ok(CcdEntry {
            content_type: content_type_for(&entry_path).to_string(),
            path: entry_path,
            content_hash,
            content_size: bytes.len() as u64,
            entryid: None,
            source: Some(path.to_path_buf()),
        })
    }
}

#[async_trait]
impl ResourceLoader for ContentLoader {
    type Resource = CcdEntry;

    async fn read_resources(&self, path: &Path) -> Vec<DeploymentItem<CcdEntry>> {
        match self.read_entry(path).await {
            Ok(entry) => vec![DeploymentItem::loaded(entry, path)],
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read content file");
                vec![DeploymentItem::failed(
                    fallback_name(path),
                    Some(path.to_path_buf()),
                    e.to_string(),
                )]
            }
        }
    }
}

pub type CcdFetcher = Fetcher<ContentLoader, BucketStore>;

/// Remote Config and Cloud Save definitions; never uploaded as content
pub const EXCLUDED_EXTENSIONS: [&str; 2] = ["rc", "csi"];

/// Fetch service for the bucket `bucket_name`, reading every file under
/// `root` except the resource files of the other services.
pub fn fetcher(gateway: Gateway, bucket_name: &str, root: impl Into<PathBuf>) -> CcdFetcher {
    Fetcher::new(
        SERVICE_NAME,
        Vec::new(),
        ContentLoader::new(root),
        BucketStore::new(CcdClient::new(gateway), bucket_name),
    )
    .excluding(EXCLUDED_EXTENSIONS.to_vec())
}
