//! Cloud Save index types

use crate::error::{CloudSaveError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ugs_core::Resource;

/// Kind of entity an index covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    #[default]
    Player,
    Custom,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Player => write!(f, "player"),
            EntityType::Custom => write!(f, "custom"),
        }
    }
}

/// Access class of the indexed data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Default,
    Public,
    Protected,
}

impl Visibility {
    pub const VALUES: [&'static str; 3] = ["default", "public", "protected"];
}

impl FromStr for Visibility {
    type Err = CloudSaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Visibility::Default),
            "public" => Ok(Visibility::Public),
            "protected" => Ok(Visibility::Protected),
            _ => Err(CloudSaveError::InvalidInput(format!(
                "Invalid visibility '{}'. Valid values are: {}",
                s,
                Visibility::VALUES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Default => write!(f, "default"),
            Visibility::Public => write!(f, "public"),
            Visibility::Protected => write!(f, "protected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexField {
    pub key: String,
    pub asc: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub fields: Vec<IndexField>,
}

/// Request body of the create-index endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexBody {
    pub index_config: IndexConfig,
}

impl CreateIndexBody {
    pub fn new(fields: Vec<IndexField>) -> Self {
        Self {
            index_config: IndexConfig { fields },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexResponse {
    pub id: String,
    pub status: String,
}

/// Index as reported by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub entity_type: EntityType,
    #[serde(default)]
    pub access: Visibility,
    pub fields: Vec<IndexField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexList {
    #[serde(default)]
    pub results: Vec<IndexInfo>,
}

/// Index definition as written in a `.csi` file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFile {
    #[serde(default)]
    pub entity_type: EntityType,
    #[serde(default, alias = "access")]
    pub visibility: Visibility,
    pub fields: Vec<IndexField>,
}

/// Reconcilable index: identified by entity, visibility and field keys
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub id: Option<String>,
    pub entity_type: EntityType,
    pub visibility: Visibility,
    pub fields: Vec<IndexField>,
}

impl Index {
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(CloudSaveError::InvalidIndex(
                "an index needs at least one field".to_string(),
            ));
        }
        if let Some(field) = self.fields.iter().find(|f| f.key.trim().is_empty()) {
            return Err(CloudSaveError::InvalidIndex(format!(
                "field key cannot be empty (asc: {})",
                field.asc
            )));
        }
        if self.entity_type == EntityType::Custom && self.visibility != Visibility::Default {
            return Err(CloudSaveError::InvalidIndex(
                "custom entity indexes only support default visibility".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<IndexFile> for Index {
    fn from(file: IndexFile) -> Self {
        Self {
            id: None,
            entity_type: file.entity_type,
            visibility: file.visibility,
            fields: file.fields,
        }
    }
}

impl From<IndexInfo> for Index {
    fn from(info: IndexInfo) -> Self {
        Self {
            id: info.id,
            entity_type: info.entity_type,
            visibility: info.access,
            fields: info.fields,
        }
    }
}

impl Resource for Index {
    type Content = Vec<bool>;

    fn key(&self) -> String {
        let keys: Vec<&str> = self.fields.iter().map(|f| f.key.as_str()).collect();
        format!("{}/{}/{}", self.entity_type, self.visibility, keys.join(","))
    }

    fn content(&self) -> Vec<bool> {
        self.fields.iter().map(|f| f.asc).collect()
    }
}
