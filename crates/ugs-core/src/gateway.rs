//! Authenticated HTTP gateway to the Unity services API

use crate::cancel::cancellable;
use crate::error::{CoreError, Result};
use futures_util::{Stream, StreamExt};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// Base URL used when none is configured
pub const DEFAULT_SERVICES_URL: &str = "https://services.api.unity.com";

/// Service account key pair
#[derive(Clone)]
pub struct Credentials {
    pub key_id: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// HTTP client shared by every service crate
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ugs-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .basic_auth(&self.credentials.key_id, Some(&self.credentials.secret))
    }

    async fn execute(&self, request: RequestBuilder, cancel: &CancellationToken) -> Result<Response> {
        let response = cancellable(cancel, async { Ok(request.send().await?) }).await?;
        check_status(response).await
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        tracing::debug!(path, "GET");
        let response = self.execute(self.request(Method::GET, path), cancel).await?;
        decode(response, cancel).await
    }

    /// GET `path` with query parameters and decode the JSON body
    pub async fn get_json_with_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        tracing::debug!(path, "GET");
        let request = self.request(Method::GET, path).query(query);
        let response = self.execute(request, cancel).await?;
        decode(response, cancel).await
    }

    /// Send a JSON body and decode the JSON response
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%method, path, "Sending request");
        let request = self.request(method, path).json(body);
        let response = self.execute(request, cancel).await?;
        decode(response, cancel).await
    }

    /// Send a JSON body to `path` with query parameters and decode the response
    pub async fn send_json_with_query<Q, B, T>(
        &self,
        method: Method,
        path: &str,
        query: &Q,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%method, path, "Sending request");
        let request = self.request(method, path).query(query).json(body);
        let response = self.execute(request, cancel).await?;
        decode(response, cancel).await
    }

    /// Send a request whose response body is ignored
    pub async fn send_empty<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(%method, path, "Sending request");
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request, cancel).await?;
        Ok(())
    }

    /// Stream an authenticated GET response into `dest`, returning the byte count
    pub async fn download<Q>(
        &self,
        path: &str,
        query: &Q,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64>
    where
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path).query(query);
        let response = self.execute(request, cancel).await?;
        write_stream(response.bytes_stream(), dest, cancel).await
    }

    /// Stream a pre-signed URL into `dest`. Signed URLs carry their own auth.
    pub async fn download_signed(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let response = self.execute(self.client.get(url), cancel).await?;
        write_stream(response.bytes_stream(), dest, cancel).await
    }

    /// Upload raw bytes to a pre-signed URL
    pub async fn put_signed(
        &self,
        url: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        self.execute(request, cancel).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response, cancel: &CancellationToken) -> Result<T> {
    let bytes = cancellable(cancel, async { Ok(response.bytes().await?) }).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Write `stream` to `dest`, creating parent directories.
///
/// `dest` is removed again when the transfer fails or is cancelled, so a
/// file on disk is always a complete download.
async fn write_stream<S, B, E>(stream: S, dest: &Path, cancel: &CancellationToken) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<CoreError>,
{
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let file = tokio::fs::File::create(dest).await?;
    match copy_chunks(file, stream, cancel).await {
        Ok(written) => {
            tracing::debug!(dest = %dest.display(), bytes = written, "Download complete");
            Ok(written)
        }
        Err(e) => {
            if let Err(remove) = tokio::fs::remove_file(dest).await {
                tracing::warn!(dest = %dest.display(), error = %remove, "Failed to remove partial download");
            }
            Err(e)
        }
    }
}

async fn copy_chunks<S, B, E>(
    mut file: tokio::fs::File,
    stream: S,
    cancel: &CancellationToken,
) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<CoreError>,
{
    let mut stream = std::pin::pin!(stream);
    let mut written = 0u64;

    while let Some(chunk) = cancellable(cancel, async { Ok(stream.next().await) }).await? {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => return Err(e.into()),
        };
        let bytes = chunk.as_ref();
        file.write_all(bytes).await?;
        written += bytes.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

#[derive(serde::Deserialize, Default)]
struct ProblemBody {
    title: Option<String>,
    detail: Option<String>,
    message: Option<String>,
}

fn problem_message(status: StatusCode, body: &str) -> String {
    let problem: ProblemBody = serde_json::from_str(body).unwrap_or_default();
    match (problem.title, problem.detail, problem.message) {
        (Some(title), Some(detail), _) => format!("{}: {}", title, detail),
        (_, Some(detail), _) => detail,
        (_, _, Some(message)) => message,
        (Some(title), None, None) => title,
        (None, None, None) if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = problem_message(status, &body);
    tracing::debug!(%status, url, message, "Request failed");

    Err(match status {
        StatusCode::NOT_FOUND => CoreError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CoreError::Unauthorized(message),
        _ => CoreError::Api {
            status: status.as_u16(),
            message,
        },
    })
}
