//! Game Server Hosting files API client

use crate::model::{
    FileDownloadRequest, FileDownloadResponse, FileList, FilesListRequest, ServerFile,
};
use reqwest::Method;
use std::path::Path;
use ugs_core::{CancellationToken, Gateway, Result, Target};

#[derive(Debug, Clone)]
pub struct GshClient {
    gateway: Gateway,
}

impl GshClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    fn files_path(target: &Target) -> String {
        format!(
            "/multiplay/files/v1/projects/{}/environments/{}/files",
            target.project_id, target.environment_id
        )
    }

    /// Files stored on the requested servers
    pub async fn list_files(
        &self,
        target: &Target,
        request: &FilesListRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<ServerFile>> {
        let list: FileList = self
            .gateway
            .send_json(Method::POST, &Self::files_path(target), request, cancel)
            .await?;
        tracing::debug!(count = list.results.len(), "Listed server files");
        Ok(list.results)
    }

    /// Download the file at `path` on `server_id` into `dest`
    pub async fn download_file(
        &self,
        target: &Target,
        server_id: i64,
        path: &str,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let request = FileDownloadRequest { server_id, path };
        let url = format!("{}/download", Self::files_path(target));
        let response: FileDownloadResponse = self
            .gateway
            .send_json(Method::POST, &url, &request, cancel)
            .await?;

        tracing::info!(server_id, path, "Downloading server file");
        self.gateway
            .download_signed(&response.url, dest, cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use ugs_core::{CoreError, Credentials};

    const FILES: &str = "/multiplay/files/v1/projects/proj/environments/env/files";

    fn client(server: &MockServer) -> GshClient {
        let gateway = Gateway::new(server.base_url(), Credentials::new("key", "secret")).unwrap();
        GshClient::new(gateway)
    }

    fn target() -> Target {
        Target::new("proj", "env")
    }

    #[tokio::test]
    async fn test_list_files() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(FILES)
                .json_body(json!({"serverIds": [123], "limit": 100}));
            then.status(200).json_body(json!({
                "results": [{
                    "filename": "error.log",
                    "path": "/logs/",
                    "fileSize": 100,
                    "createdAt": "2022-10-11T08:00:00Z",
                    "lastModified": "2022-10-11T09:00:00Z",
                    "server": {"id": 123, "machineId": 5}
                }]
            }));
        });

        let request = FilesListRequest {
            server_ids: vec![123],
            path_filter: None,
            limit: 100,
            modified_from: None,
            modified_to: None,
        };
        let files = client(&server)
            .list_files(&target(), &request, &CancellationToken::new())
            .await
            .unwrap();

        mock.assert();
        assert_eq!(files[0].filename, "error.log");
        assert_eq!(files[0].server.as_ref().map(|s| s.id), Some(123));
    }

    #[tokio::test]
    async fn test_download_file_follows_signed_url() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path(format!("{}/download", FILES))
                .json_body(json!({"serverId": 1212, "path": "/logs/error.log"}));
            then.status(200)
                .json_body(json!({"url": server.url("/signed/error.log")}));
        });
        let content = server.mock(|when, then| {
            when.method(GET).path("/signed/error.log");
            then.status(200).body("boom at line 3");
        });
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("server.log");

        client(&server)
            .download_file(
                &target(),
                1212,
                "/logs/error.log",
                &dest,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        content.assert();
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "boom at line 3");
    }

    #[tokio::test]
    async fn test_unknown_file_is_not_found() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(format!("{}/download", FILES));
            then.status(404).json_body(json!({"detail": "file not found"}));
        });
        let dir = tempfile::tempdir().unwrap();

        let result = client(&server)
            .download_file(
                &target(),
                1,
                "/nope",
                &dir.path().join("x"),
                &CancellationToken::new(),
            )
            .await;
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }
}
