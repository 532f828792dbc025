//! Cloud Save data API client

use crate::model::{
    CreateIndexBody, CreateIndexResponse, EntityType, Index, IndexInfo, IndexList, Visibility,
};
use async_trait::async_trait;
use reqwest::Method;
use ugs_core::{CancellationToken, CoreError, Gateway, RemoteStore, Result, Target};

/// Cloud Save index manager
#[derive(Debug, Clone)]
pub struct CloudSaveClient {
    gateway: Gateway,
}

impl CloudSaveClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    fn indexes_path(target: &Target) -> String {
        format!(
            "/cloud-save/v1/data/projects/{}/environments/{}/indexes",
            target.project_id, target.environment_id
        )
    }

    /// List every index of the environment
    pub async fn list_indexes(
        &self,
        target: &Target,
        cancel: &CancellationToken,
    ) -> Result<Vec<IndexInfo>> {
        let list: IndexList = self
            .gateway
            .get_json(&Self::indexes_path(target), cancel)
            .await?;
        Ok(list.results)
    }

    /// Create an index over player data
    pub async fn create_player_index(
        &self,
        target: &Target,
        visibility: Visibility,
        body: &CreateIndexBody,
        cancel: &CancellationToken,
    ) -> Result<CreateIndexResponse> {
        let suffix = match visibility {
            Visibility::Default => "players",
            Visibility::Public => "players/public",
            Visibility::Protected => "players/protected",
        };
        let path = format!("{}/{}", Self::indexes_path(target), suffix);
        tracing::info!(%visibility, "Creating player index");
        self.gateway
            .send_json(Method::POST, &path, body, cancel)
            .await
    }

    /// Create an index over custom entity data
    pub async fn create_custom_index(
        &self,
        target: &Target,
        body: &CreateIndexBody,
        cancel: &CancellationToken,
    ) -> Result<CreateIndexResponse> {
        let path = format!("{}/custom", Self::indexes_path(target));
        tracing::info!("Creating custom index");
        self.gateway
            .send_json(Method::POST, &path, body, cancel)
            .await
    }

    pub async fn delete_index(
        &self,
        target: &Target,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let path = format!("{}/{}", Self::indexes_path(target), id);
        self.gateway
            .send_empty::<()>(Method::DELETE, &path, None, cancel)
            .await
    }
}

#[async_trait]
impl RemoteStore for CloudSaveClient {
    type Resource = Index;

    async fn list(&self, target: &Target, cancel: &CancellationToken) -> Result<Vec<Index>> {
        Ok(self
            .list_indexes(target, cancel)
            .await?
            .into_iter()
            .map(Index::from)
            .collect())
    }

    async fn create(
        &self,
        target: &Target,
        resource: &Index,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let body = CreateIndexBody::new(resource.fields.clone());
        let response = match resource.entity_type {
            EntityType::Player => {
                self.create_player_index(target, resource.visibility, &body, cancel)
                    .await?
            }
            EntityType::Custom => self.create_custom_index(target, &body, cancel).await?,
        };
        tracing::debug!(id = %response.id, status = %response.status, "Index created");
        Ok(())
    }

    /// Indexes are immutable, so the desired index is created next to the
    /// current one and the current one is dropped afterwards.
    ///
    /// When the service refuses the duplicate, the current index is dropped
    /// first and recreated if the desired one still cannot be created.
    async fn update(
        &self,
        target: &Target,
        desired: &Index,
        current: &Index,
        cancel: &CancellationToken,
    ) -> Result<()> {
        match self.create(target, desired, cancel).await {
            Ok(()) => self.delete(target, current, cancel).await,
            Err(CoreError::Api { status: 409, .. }) => {
                tracing::debug!("Index already exists, replacing it in place");
                self.delete(target, current, cancel).await?;
                if let Err(e) = self.create(target, desired, cancel).await {
                    if let Err(restore) = self.create(target, current, cancel).await {
                        tracing::warn!(error = %restore, "Failed to restore replaced index");
                    }
                    return Err(e);
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete(
        &self,
        target: &Target,
        resource: &Index,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let id = resource.id.as_deref().ok_or_else(|| {
            CoreError::Unsupported(format!(
                "index '{}' has no identifier and cannot be deleted",
                ugs_core::Resource::key(resource)
            ))
        })?;
        self.delete_index(target, id, cancel).await
    }
}
