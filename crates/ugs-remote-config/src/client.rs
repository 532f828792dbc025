//! Remote Config admin API client

use crate::model::{
    ConfigEntry, ConfigList, CreateConfigBody, CreateConfigResponse, SETTINGS_CONFIG_TYPE,
    SettingsConfig, UpdateConfigBody,
};
use async_trait::async_trait;
use reqwest::Method;
use std::time::Instant;
use ugs_core::{
    ApplyResult, CancellationToken, ChangeKind, CoreError, FetchResult, Gateway, RemoteStore,
    Result, Target, ensure_not_cancelled,
};

/// Remote Config settings manager
#[derive(Debug, Clone)]
pub struct RemoteConfigClient {
    gateway: Gateway,
}

impl RemoteConfigClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Settings config of the environment, if one exists
    pub async fn get_settings(
        &self,
        target: &Target,
        cancel: &CancellationToken,
    ) -> Result<Option<SettingsConfig>> {
        let path = format!(
            "/remote-config/v1/projects/{}/environments/{}/configs",
            target.project_id, target.environment_id
        );
        let list: ConfigList = self.gateway.get_json(&path, cancel).await?;
        Ok(list
            .configs
            .into_iter()
            .find(|c| c.config_type == SETTINGS_CONFIG_TYPE))
    }

    /// Replace the whole settings document, creating it when `config_id` is absent.
    ///
    /// Returns the identifier of the written config.
    pub async fn write_settings(
        &self,
        target: &Target,
        config_id: Option<&str>,
        entries: &[ConfigEntry],
        cancel: &CancellationToken,
    ) -> Result<String> {
        match config_id {
            Some(id) => {
                let path = format!("/remote-config/v1/projects/{}/configs/{}", target.project_id, id);
                let body = UpdateConfigBody {
                    config_type: SETTINGS_CONFIG_TYPE,
                    value: entries,
                };
                tracing::info!(config_id = id, entries = entries.len(), "Updating settings");
                self.gateway
                    .send_empty(Method::PUT, &path, Some(&body), cancel)
                    .await?;
                Ok(id.to_string())
            }
            None => {
                let path = format!("/remote-config/v1/projects/{}/configs", target.project_id);
                let body = CreateConfigBody {
                    config_type: SETTINGS_CONFIG_TYPE,
                    environment_id: &target.environment_id,
                    value: entries,
                };
                tracing::info!(entries = entries.len(), "Creating settings config");
                let created: CreateConfigResponse = self
                    .gateway
                    .send_json(Method::POST, &path, &body, cancel)
                    .await?;
                Ok(created.id)
            }
        }
    }

    /// Read the settings, let `edit` change them and write them back
    async fn modify<F>(&self, target: &Target, cancel: &CancellationToken, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<ConfigEntry>) + Send,
    {
        let current = self.get_settings(target, cancel).await?;
        let config_id = current.as_ref().map(|c| c.id.clone());
        let mut entries = current.map(|c| c.value).unwrap_or_default();
        edit(&mut entries);
        self.write_settings(target, config_id.as_deref(), &entries, cancel)
            .await?;
        Ok(())
    }
}

fn upsert(entries: &mut Vec<ConfigEntry>, entry: &ConfigEntry) {
    match entries.iter_mut().find(|e| e.key == entry.key) {
        Some(existing) => *existing = entry.clone(),
        None => entries.push(entry.clone()),
    }
}

#[async_trait]
impl RemoteStore for RemoteConfigClient {
    type Resource = ConfigEntry;

    async fn list(&self, target: &Target, cancel: &CancellationToken) -> Result<Vec<ConfigEntry>> {
        Ok(self
            .get_settings(target, cancel)
            .await?
            .map(|c| c.value)
            .unwrap_or_default())
    }

    async fn create(
        &self,
        target: &Target,
        resource: &ConfigEntry,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.modify(target, cancel, |entries| upsert(entries, resource))
            .await
    }

    async fn update(
        &self,
        target: &Target,
        desired: &ConfigEntry,
        _current: &ConfigEntry,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.modify(target, cancel, |entries| upsert(entries, desired))
            .await
    }

    async fn delete(
        &self,
        target: &Target,
        resource: &ConfigEntry,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.modify(target, cancel, |entries| {
            entries.retain(|e| e.key != resource.key)
        })
        .await
    }

    /// All settings live in one document, so every change goes out in a
    /// single write; if it fails, every change fails.
    async fn apply_changes(
        &self,
        target: &Target,
        result: &FetchResult<ConfigEntry>,
        cancel: &CancellationToken,
    ) -> Result<ApplyResult> {
        let start = Instant::now();
        ensure_not_cancelled(cancel)?;

        let current = self.get_settings(target, cancel).await?;
        let config_id = current.as_ref().map(|c| c.id.clone());
        let mut entries = current.map(|c| c.value).unwrap_or_default();
        let mut changes = Vec::new();

        for item in result.created.iter().chain(&result.updated) {
            if let Some(entry) = item.resource() {
                upsert(&mut entries, entry);
                let kind = if item.counterpart().is_some() {
                    ChangeKind::Updated
                } else {
                    ChangeKind::Created
                };
                changes.push((item.name().to_string(), kind));
            }
        }
        for item in &result.deleted {
            if let Some(entry) = item.resource() {
                entries.retain(|e| e.key != entry.key);
                changes.push((item.name().to_string(), ChangeKind::Deleted));
            }
        }

        let mut applied = ApplyResult::new();
        if changes.is_empty() {
            return Ok(applied);
        }

        let written = match ensure_not_cancelled(cancel) {
            Ok(()) => {
                self.write_settings(target, config_id.as_deref(), &entries, cancel)
                    .await
            }
            Err(e) => Err(e),
        };
        match written {
            Ok(_) => {
                for (name, kind) in changes {
                    applied.add_success(name, kind);
                }
            }
            Err(CoreError::Cancelled) => {
                for (name, kind) in changes {
                    applied.add_cancelled(name, kind);
                }
            }
            Err(e) => {
                let message = e.to_string();
                for (name, kind) in changes {
                    applied.add_failure(name, kind, message.clone());
                }
            }
        }

        applied.duration_ms = start.elapsed().as_millis() as u64;
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConfigType;
    use httpmock::prelude::*;
    use serde_json::json;
    use ugs_core::{Credentials, DeploymentItem, reconcile};

    const CONFIGS: &str = "/remote-config/v1/projects/proj/environments/env/configs";

    fn client(server: &MockServer) -> RemoteConfigClient {
        let gateway = Gateway::new(server.base_url(), Credentials::new("key", "secret")).unwrap();
        RemoteConfigClient::new(gateway)
    }

    fn target() -> Target {
        Target::new("proj", "env")
    }

    fn entry(key: &str, value: serde_json::Value) -> ConfigEntry {
        ConfigEntry::new(key, ConfigType::infer(&value), value)
    }

    #[tokio::test]
    async fn test_list_picks_settings_config() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(CONFIGS);
            then.status(200).json_body(json!({
                "configs": [
                    {"id": "other", "type": "experiments", "value": []},
                    {"id": "cfg-1", "type": "settings", "value": [
                        {"key": "volume", "type": "float", "value": 0.5}
                    ]}
                ]
            }));
        });

        let entries = client(&server)
            .list(&target(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(entries, vec![ConfigEntry::new("volume", ConfigType::Float, json!(0.5))]);
    }

    #[tokio::test]
    async fn test_apply_changes_writes_once() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(CONFIGS);
            then.status(200).json_body(json!({
                "configs": [{"id": "cfg-1", "type": "settings", "value": [
                    {"key": "b", "type": "int", "value": 1},
                    {"key": "c", "type": "string", "value": "old"}
                ]}]
            }));
        });
        let put = server.mock(|when, then| {
            when.method(PUT)
                .path("/remote-config/v1/projects/proj/configs/cfg-1")
                .json_body(json!({
                    "type": "settings",
                    "value": [
                        {"key": "b", "type": "int", "value": 2},
                        {"key": "a", "type": "bool", "value": true}
                    ]
                }));
            then.status(204);
        });

        let client = client(&server);
        let cancel = CancellationToken::new();
        let remote = client.list(&target(), &cancel).await.unwrap();
        let local = vec![
            DeploymentItem::loaded(entry("a", json!(true)), "game.rc"),
            DeploymentItem::loaded(entry("b", json!(2)), "game.rc"),
        ];
        let result = reconcile(local, remote, true, false);

        let applied = client
            .apply_changes(&target(), &result, &cancel)
            .await
            .unwrap();

        put.assert();
        assert!(applied.is_success());
        assert_eq!(applied.succeeded.len(), 3);
        assert_eq!(applied.succeeded[1].kind, ChangeKind::Updated);
    }

    #[tokio::test]
    async fn test_apply_changes_creates_missing_config() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(CONFIGS);
            then.status(200).json_body(json!({"configs": []}));
        });
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/remote-config/v1/projects/proj/configs")
                .json_body(json!({
                    "type": "settings",
                    "environmentId": "env",
                    "value": [{"key": "a", "type": "string", "value": "x"}]
                }));
            then.status(200).json_body(json!({"id": "cfg-new"}));
        });

        let local = vec![DeploymentItem::loaded(entry("a", json!("x")), "game.rc")];
        let result = reconcile(local, Vec::new(), false, false);

        let applied = client(&server)
            .apply_changes(&target(), &result, &CancellationToken::new())
            .await
            .unwrap();

        post.assert();
        assert!(applied.is_success());
    }

    #[tokio::test]
    async fn test_failed_write_fails_every_change() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(CONFIGS);
            then.status(200)
                .json_body(json!({"configs": [{"id": "cfg-1", "type": "settings", "value": []}]}));
        });
        server.mock(|when, then| {
            when.method(PUT).path("/remote-config/v1/projects/proj/configs/cfg-1");
            then.status(400).json_body(json!({"detail": "value too large"}));
        });

        let local = vec![
            DeploymentItem::loaded(entry("a", json!(1)), "game.rc"),
            DeploymentItem::loaded(entry("b", json!(2)), "game.rc"),
        ];
        let result = reconcile(local, Vec::new(), false, false);

        let applied = client(&server)
            .apply_changes(&target(), &result, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(applied.failed.len(), 2);
        assert!(
            applied.failed[0]
                .error
                .as_deref()
                .is_some_and(|e| e.contains("value too large"))
        );
    }
}
