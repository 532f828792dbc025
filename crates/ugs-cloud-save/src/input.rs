//! Validation of `index create` arguments

use crate::error::{CloudSaveError, Result};
use crate::model::{CreateIndexBody, IndexField, Visibility};
use std::path::Path;

/// Raw arguments of the create-index command
#[derive(Debug, Clone, Default)]
pub struct CreateIndexInput {
    /// JSON array of `{key, asc}` objects
    pub fields: Option<String>,
    /// JSON request body, inline or a path to a file holding it
    pub body: Option<String>,
    pub visibility: Option<String>,
}

impl CreateIndexInput {
    /// Turn the arguments into a visibility and a request body.
    ///
    /// Exactly one of `fields` and `body` must be given.
    pub fn parse(&self) -> Result<(Visibility, CreateIndexBody)> {
        let visibility = match self.visibility.as_deref() {
            Some(v) => v.parse()?,
            None => Visibility::Default,
        };

        let body = match (self.fields.as_deref(), self.body.as_deref()) {
            (Some(_), Some(_)) => {
                return Err(CloudSaveError::InvalidInput(
                    "Provide either --fields or --body, not both".to_string(),
                ));
            }
            (None, None) => {
                return Err(CloudSaveError::InvalidInput(
                    "An index definition is required: provide --fields or --body".to_string(),
                ));
            }
            (Some(fields), None) => {
                let fields: Vec<IndexField> = serde_json::from_str(fields).map_err(|e| {
                    CloudSaveError::InvalidInput(format!("Invalid --fields value: {}", e))
                })?;
                CreateIndexBody::new(fields)
            }
            (None, Some(body)) => {
                let raw = read_file_or_body(body)?;
                serde_json::from_str(&raw).map_err(|e| {
                    CloudSaveError::InvalidInput(format!("Invalid --body value: {}", e))
                })?
            }
        };

        if body.index_config.fields.is_empty() {
            return Err(CloudSaveError::InvalidInput(
                "An index needs at least one field".to_string(),
            ));
        }

        Ok((visibility, body))
    }
}

fn read_file_or_body(value: &str) -> Result<String> {
    let path = Path::new(value);
    if !value.trim_start().starts_with('{') && path.is_file() {
        tracing::debug!(path = %path.display(), "Reading index body from file");
        return Ok(std::fs::read_to_string(path)?);
    }
    Ok(value.to_string())
}
