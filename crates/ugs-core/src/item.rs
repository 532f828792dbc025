//! Deployment items: the unit of comparison in a fetch

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Capability every reconcilable resource shape implements.
///
/// Services describe their local and remote payloads with the same type so
/// the diff can compare them without knowing anything service-specific.
pub trait Resource: Clone + Send + Sync + 'static {
    /// The part of the resource compared between local and remote copies
    type Content: PartialEq;

    /// Unique key of the resource within a service and environment
    fn key(&self) -> String;

    /// Content used to decide between "updated" and "unchanged"
    fn content(&self) -> Self::Content;
}

/// Severity of an item's status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Category an item ends up in after the diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    Unchanged,
}

impl ChangeKind {
    /// Tag stored in [`Status::detail`]
    pub fn tag(&self) -> &'static str {
        match self {
            ChangeKind::Created => "Created",
            ChangeKind::Updated => "Updated",
            ChangeKind::Deleted => "Deleted",
            ChangeKind::Unchanged => "",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Created => write!(f, "created"),
            ChangeKind::Updated => write!(f, "updated"),
            ChangeKind::Deleted => write!(f, "deleted"),
            ChangeKind::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Status attached to an item when it is produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub severity: Severity,

    /// Diff-category tag for successful items, a readable message otherwise
    pub detail: String,
}

impl Status {
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            detail: detail.into(),
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            detail: detail.into(),
        }
    }

    pub fn change(kind: ChangeKind) -> Self {
        Self::success(kind.tag())
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// One named resource with its payload and status.
///
/// Items are built by a loader, a remote listing or the diff step and are
/// never modified afterwards; the diff produces new items instead.
#[derive(Debug, Clone)]
pub struct DeploymentItem<R> {
    name: String,
    path: Option<PathBuf>,
    resource: Option<R>,
    counterpart: Option<R>,
    status: Status,
}

impl<R: Resource> DeploymentItem<R> {
    /// Item parsed from a local file
    pub fn loaded(resource: R, path: impl Into<PathBuf>) -> Self {
        Self {
            name: resource.key(),
            path: Some(path.into()),
            resource: Some(resource),
            counterpart: None,
            status: Status::default(),
        }
    }

    /// Item that only exists in the remote listing
    pub fn remote(resource: R) -> Self {
        Self {
            name: resource.key(),
            path: None,
            resource: Some(resource),
            counterpart: None,
            status: Status::default(),
        }
    }

    /// Item whose source could not be read or parsed
    pub fn failed(
        name: impl Into<String>,
        path: Option<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            resource: None,
            counterpart: None,
            status: Status::error(message),
        }
    }
}

impl<R> DeploymentItem<R> {
    pub(crate) fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn with_counterpart(mut self, counterpart: R) -> Self {
        self.counterpart = Some(counterpart);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn resource(&self) -> Option<&R> {
        self.resource.as_ref()
    }

    /// Remote copy matched with this local item, if any
    pub fn counterpart(&self) -> Option<&R> {
        self.counterpart.as_ref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// `'name' in 'path'` for items with a source file, the bare name otherwise
    pub fn label(&self) -> String {
        match &self.path {
            Some(path) => format!("'{}' in '{}'", self.name, path.display()),
            None => self.name.clone(),
        }
    }
}
