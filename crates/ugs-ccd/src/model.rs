//! Cloud Content Delivery types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use ugs_core::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// Entry as reported by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub entryid: String,
    pub path: String,
    pub content_hash: String,
    pub content_size: u64,
    #[serde(default)]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_versionid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_url: Option<String>,
}

/// Body of the create and update entry requests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRequest {
    pub path: String,
    pub content_hash: String,
    pub content_size: u64,
    pub content_type: String,
    pub signed_url: bool,
}

/// Reconcilable entry: identified by its path, compared by content hash and size
#[derive(Debug, Clone, PartialEq)]
pub struct CcdEntry {
    pub path: String,
    pub content_hash: String,
    pub content_size: u64,
    pub content_type: String,
    /// Identifier on the service, for remote entries
    pub entryid: Option<String>,
    /// Local file holding the content, for local entries
    pub source: Option<PathBuf>,
}

impl CcdEntry {
    pub(crate) fn request(&self) -> EntryRequest {
        EntryRequest {
            path: self.path.clone(),
            content_hash: self.content_hash.clone(),
            content_size: self.content_size,
            content_type: self.content_type.clone(),
            signed_url: true,
        }
    }
}

impl From<Entry> for CcdEntry {
    fn from(entry: Entry) -> Self {
        Self {
            path: entry.path,
            content_hash: entry.content_hash,
            content_size: entry.content_size,
            content_type: entry.content_type,
            entryid: Some(entry.entryid),
            source: None,
        }
    }
}

impl Resource for CcdEntry {
    type Content = (String, u64);

    fn key(&self) -> String {
        self.path.clone()
    }

    fn content(&self) -> (String, u64) {
        (self.content_hash.to_ascii_lowercase(), self.content_size)
    }
}

/// Content type sent for a file, from its extension
pub fn content_type_for(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "json" => "application/json",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
