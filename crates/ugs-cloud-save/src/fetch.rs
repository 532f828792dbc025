//! Cloud Save index files and the fetch service

use crate::client::CloudSaveClient;
use crate::error::{CloudSaveError, Result};
use crate::model::{Index, IndexFile};
use async_trait::async_trait;
use std::path::Path;
use ugs_core::{DeploymentItem, Fetcher, Gateway, ResourceLoader, fallback_name};

pub const SERVICE_NAME: &str = "Cloud Save";
pub const INDEX_FILE_EXTENSION: &str = "csi";

/// Reads `.csi` index definition files
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexLoader;

impl IndexLoader {
    async fn parse(path: &Path) -> Result<Index> {
        let content = tokio::fs::read_to_string(path).await?;
        let file: IndexFile = serde_json::from_str(&content)?;
        let index = Index::from(file);
        index.validate()?;
        Ok(index)
    }
}

#[async_trait]
impl ResourceLoader for IndexLoader {
    type Resource = Index;

    async fn read_resources(&self, path: &Path) -> Vec<DeploymentItem<Index>> {
        match Self::parse(path).await {
            Ok(index) => vec![DeploymentItem::loaded(index, path)],
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read index file");
                vec![DeploymentItem::failed(
                    fallback_name(path),
                    Some(path.to_path_buf()),
                    describe(&e),
                )]
            }
        }
    }
}

fn describe(error: &CloudSaveError) -> String {
    match error {
        CloudSaveError::JsonError(e) => format!("Failed to parse index file: {}", e),
        other => other.to_string(),
    }
}

pub type CloudSaveFetcher = Fetcher<IndexLoader, CloudSaveClient>;

pub fn fetcher(gateway: Gateway) -> CloudSaveFetcher {
    Fetcher::new(
        SERVICE_NAME,
        vec![INDEX_FILE_EXTENSION],
        IndexLoader,
        CloudSaveClient::new(gateway),
    )
}
