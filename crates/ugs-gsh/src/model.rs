//! Server file types

use crate::error::{GshError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default number of files returned by a listing
pub const DEFAULT_FILE_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileServer {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

/// File stored on a game server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerFile {
    pub filename: String,
    pub path: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<FileServer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileList {
    #[serde(default)]
    pub results: Vec<ServerFile>,
}

/// Body of the file listing request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListRequest {
    pub server_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_filter: Option<String>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileDownloadRequest<'a> {
    pub server_id: i64,
    pub path: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileDownloadResponse {
    pub url: String,
}

/// Raw arguments of `gsh server files list`
#[derive(Debug, Clone, Default)]
pub struct FilesListInput {
    pub server_ids: Vec<String>,
    pub path_filter: Option<String>,
    pub limit: Option<u32>,
    pub modified_from: Option<String>,
    pub modified_to: Option<String>,
}

impl FilesListInput {
    pub fn into_request(self) -> Result<FilesListRequest> {
        let server_ids = self
            .server_ids
            .iter()
            .map(|id| parse_server_id(id))
            .collect::<Result<Vec<_>>>()?;

        let limit = self.limit.unwrap_or(DEFAULT_FILE_LIMIT);
        if limit == 0 {
            return Err(GshError::InvalidLimit("limit must be at least 1".to_string()));
        }

        Ok(FilesListRequest {
            server_ids,
            path_filter: self.path_filter.filter(|p| !p.is_empty()),
            limit,
            modified_from: self.modified_from.as_deref().map(parse_date).transpose()?,
            modified_to: self.modified_to.as_deref().map(parse_date).transpose()?,
        })
    }
}

pub fn parse_server_id(value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| GshError::InvalidServerId(value.to_string()))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Ok(date_time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| GshError::InvalidDate {
            value: value.to_string(),
            reason: "expected RFC 3339 (2024-01-31T12:00:00Z) or YYYY-MM-DD".to_string(),
        })
}
