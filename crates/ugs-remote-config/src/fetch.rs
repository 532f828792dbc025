//! `.rc` files and the Remote Config fetch service

use crate::client::RemoteConfigClient;
use crate::error::{RemoteConfigError, Result};
use crate::model::{ConfigEntry, RcFile};
use async_trait::async_trait;
use std::path::Path;
use ugs_core::{DeploymentItem, Fetcher, Gateway, ResourceLoader, fallback_name};

pub const SERVICE_NAME: &str = "Remote Config";
pub const CONFIG_FILE_EXTENSION: &str = "rc";

/// Reads `.rc` files; every key of a file becomes one item
#[derive(Debug, Default, Clone, Copy)]
pub struct RcLoader;

impl RcLoader {
    async fn parse(path: &Path) -> Result<RcFile> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| {
            RemoteConfigError::InvalidFile(format!("{}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl ResourceLoader for RcLoader {
    type Resource = ConfigEntry;

    async fn read_resources(&self, path: &Path) -> Vec<DeploymentItem<ConfigEntry>> {
        let file = match Self::parse(path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file");
                return vec![DeploymentItem::failed(
                    fallback_name(path),
                    Some(path.to_path_buf()),
                    e.to_string(),
                )];
            }
        };

        file.into_entries()
            .into_iter()
            .map(|(key, entry)| match entry {
                Ok(entry) => DeploymentItem::loaded(entry, path),
                Err(e) => DeploymentItem::failed(key, Some(path.to_path_buf()), e.to_string()),
            })
            .collect()
    }
}

pub type RemoteConfigFetcher = Fetcher<RcLoader, RemoteConfigClient>;

pub fn fetcher(gateway: Gateway) -> RemoteConfigFetcher {
    Fetcher::new(
        SERVICE_NAME,
        vec![CONFIG_FILE_EXTENSION],
        RcLoader,
        RemoteConfigClient::new(gateway),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use ugs_core::{CancellationToken, Credentials, FetchInput, FetchService, Target};

    #[tokio::test]
    async fn test_loader_yields_item_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.rc");
        std::fs::write(
            &path,
            r#"{"entries": {"lives": 3, "mode": "arcade", "speed": "x"}, "types": {"speed": "FLOAT"}}"#,
        )
        .unwrap();

        let items = RcLoader.read_resources(&path).await;
        let names: Vec<_> = items.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["lives", "mode", "speed"]);
        assert!(!items[0].status().is_error());
        assert!(items[2].status().is_error());
    }

    #[tokio::test]
    async fn test_loader_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.rc");
        std::fs::write(&path, "{ entries: ").unwrap();

        let items = RcLoader.read_resources(&path).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name(), "broken");
        assert!(items[0].status().is_error());
    }

    // a/x local, b/y on both sides, c/z remote only
    #[tokio::test]
    async fn test_fetch_scenario() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/remote-config/v1/projects/proj/environments/env/configs");
            then.status(200).json_body(json!({
                "configs": [{"id": "cfg", "type": "settings", "value": [
                    {"key": "b", "type": "string", "value": "y"},
                    {"key": "c", "type": "string", "value": "z"}
                ]}]
            }));
        });

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("game.rc"),
            r#"{"entries": {"a": "x", "b": "y"}}"#,
        )
        .unwrap();
        let gateway = Gateway::new(server.base_url(), Credentials::new("key", "secret")).unwrap();
        let fetcher = fetcher(gateway);
        let cancel = CancellationToken::new();

        let reconciled = fetcher
            .fetch_report(
                &FetchInput::new(dir.path()).dry_run(true).reconcile(true),
                &Target::new("proj", "env"),
                &(),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(reconciled.created.len(), 1);
        assert_eq!(reconciled.unchanged.len(), 1);
        assert_eq!(reconciled.deleted, vec!["c"]);

        let kept = fetcher
            .fetch_report(
                &FetchInput::new(dir.path()).dry_run(true),
                &Target::new("proj", "env"),
                &(),
                &cancel,
            )
            .await
            .unwrap();
        assert!(kept.deleted.is_empty());
        assert_eq!(kept.created.len() + kept.unchanged.len(), 2);
    }
}
