//! Environment name to identifier resolution

use crate::error::{CoreError, Result};
use crate::gateway::Gateway;
use crate::store::EnvironmentResolver;
use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct EnvironmentList {
    #[serde(default)]
    results: Vec<EnvironmentInfo>,
}

/// Resolves a configured environment name through the Unity environments API
pub struct UnityEnvironment {
    gateway: Gateway,
    project_id: String,
    name: Option<String>,
}

impl UnityEnvironment {
    pub fn new(gateway: Gateway, project_id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            gateway,
            project_id: project_id.into(),
            name,
        }
    }

    /// List every environment of the project
    pub async fn list(&self, cancel: &CancellationToken) -> Result<Vec<EnvironmentInfo>> {
        let path = format!("/unity/v1/projects/{}/environments", self.project_id);
        let list: EnvironmentList = self.gateway.get_json(&path, cancel).await?;
        Ok(list.results)
    }
}

#[async_trait]
impl EnvironmentResolver for UnityEnvironment {
    async fn fetch_identifier(&self, cancel: &CancellationToken) -> Result<String> {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| CoreError::InvalidConfig("Environment name is not set".to_string()))?;

        let environments = self.list(cancel).await?;
        let found = environments
            .into_iter()
            .find(|env| env.name == name)
            .ok_or_else(|| CoreError::NotFound(format!("environment '{}'", name)))?;

        tracing::debug!(name, id = %found.id, "Resolved environment");
        Ok(found.id)
    }
}
