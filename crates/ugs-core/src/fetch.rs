//! Fetch results and the reconciliation diff

use crate::item::{ChangeKind, DeploymentItem, Resource, Status};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Options of a fetch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchInput {
    /// Directory or file to scan for local resources
    pub path: PathBuf,

    /// Compute the diff without issuing any mutating remote call
    pub dry_run: bool,

    /// Treat remote resources without a local counterpart as deletions
    pub reconcile: bool,
}

impl FetchInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn reconcile(mut self, reconcile: bool) -> Self {
        self.reconcile = reconcile;
        self
    }
}

/// Partitioned outcome of a fetch
#[derive(Debug, Clone)]
pub struct FetchResult<R> {
    pub updated: Vec<DeploymentItem<R>>,
    pub deleted: Vec<DeploymentItem<R>>,
    pub created: Vec<DeploymentItem<R>>,
    pub unchanged: Vec<DeploymentItem<R>>,
    pub errored: Vec<DeploymentItem<R>>,
    pub dry_run: bool,
}

impl<R> FetchResult<R> {
    pub fn new(dry_run: bool) -> Self {
        Self {
            updated: Vec::new(),
            deleted: Vec::new(),
            created: Vec::new(),
            unchanged: Vec::new(),
            errored: Vec::new(),
            dry_run,
        }
    }

    /// Whether any item would be created, updated or deleted
    pub fn has_changes(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty())
    }

    pub fn has_errors(&self) -> bool {
        !self.errored.is_empty()
    }

    /// Items of one diff category
    pub fn items(&self, kind: ChangeKind) -> &[DeploymentItem<R>] {
        match kind {
            ChangeKind::Created => &self.created,
            ChangeKind::Updated => &self.updated,
            ChangeKind::Deleted => &self.deleted,
            ChangeKind::Unchanged => &self.unchanged,
        }
    }

    pub fn total(&self) -> usize {
        self.created.len()
            + self.updated.len()
            + self.deleted.len()
            + self.unchanged.len()
            + self.errored.len()
    }

    pub fn summary(&self) -> FetchSummary {
        FetchSummary {
            created: self.created.len(),
            updated: self.updated.len(),
            deleted: self.deleted.len(),
            unchanged: self.unchanged.len(),
            errored: self.errored.len(),
            dry_run: self.dry_run,
        }
    }

    /// Presentation form of the result, grouped by category
    pub fn report(&self, service: impl Into<String>) -> FetchReport {
        let labels = |items: &[DeploymentItem<R>]| -> Vec<String> {
            items.iter().map(|i| i.label()).collect()
        };
        FetchReport {
            service: service.into(),
            dry_run: self.dry_run,
            created: labels(&self.created),
            updated: labels(&self.updated),
            deleted: labels(&self.deleted),
            unchanged: labels(&self.unchanged),
            errors: self
                .errored
                .iter()
                .map(|i| ErrorEntry {
                    item: i.label(),
                    message: i.status().detail.clone(),
                })
                .collect(),
        }
    }

    /// Move every item named in `failures` into `errored`, carrying the failure message.
    pub fn mark_failed(&mut self, failures: &[ActionResult]) {
        if failures.is_empty() {
            return;
        }
        let messages: HashMap<&str, &str> = failures
            .iter()
            .map(|f| (f.item.as_str(), f.error.as_deref().unwrap_or("unknown error")))
            .collect();

        for bucket in [&mut self.created, &mut self.updated, &mut self.deleted] {
            let (failed, kept): (Vec<_>, Vec<_>) = std::mem::take(bucket)
                .into_iter()
                .partition(|item| messages.contains_key(item.name()));
            *bucket = kept;
            for item in failed {
                let message = messages[item.name()];
                self.errored.push(item.with_status(Status::error(message)));
            }
        }
    }
}

/// Counts per category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub errored: usize,
    pub dry_run: bool,
}

impl std::fmt::Display for FetchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dry_run {
            write!(
                f,
                "{} to create, {} to update, {} to delete, {} unchanged, {} failed",
                self.created, self.updated, self.deleted, self.unchanged, self.errored
            )
        } else {
            write!(
                f,
                "{} created, {} updated, {} deleted, {} unchanged, {} failed",
                self.created, self.updated, self.deleted, self.unchanged, self.errored
            )
        }
    }
}

/// Grouped labels handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    pub service: String,
    pub dry_run: bool,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    pub unchanged: Vec<String>,
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub item: String,
    pub message: String,
}

/// Result of pushing the computed changes to the remote service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyResult {
    pub succeeded: Vec<ActionResult>,
    pub failed: Vec<ActionResult>,

    /// Set when cancellation stopped the run before every change was applied
    #[serde(default)]
    pub cancelled: bool,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, item: impl Into<String>, kind: ChangeKind) {
        self.succeeded.push(ActionResult {
            item: item.into(),
            kind,
            error: None,
        });
    }

    pub fn add_failure(&mut self, item: impl Into<String>, kind: ChangeKind, error: String) {
        self.failed.push(ActionResult {
            item: item.into(),
            kind,
            error: Some(error),
        });
    }

    /// Record a change that was skipped or interrupted by cancellation
    pub fn add_cancelled(&mut self, item: impl Into<String>, kind: ChangeKind) {
        self.cancelled = true;
        self.add_failure(item, kind, NOT_APPLIED_CANCELLED.to_string());
    }
}

/// Failure message of changes left out by a cancelled run
pub const NOT_APPLIED_CANCELLED: &str = "Not applied: operation cancelled";

/// Outcome of one remote mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Name of the item the mutation targeted
    pub item: String,
    pub kind: ChangeKind,
    pub error: Option<String>,
}

/// Diff local items against the remote listing.
///
/// Local items keep their input order; remote-only items follow in remote
/// order and are only reported (as deletions) when `reconcile` is set.
/// A key defined twice locally keeps its first definition, later ones are
/// reported as errors.
pub fn reconcile<R: Resource>(
    local: Vec<DeploymentItem<R>>,
    remote: Vec<R>,
    reconcile: bool,
    dry_run: bool,
) -> FetchResult<R> {
    let mut result = FetchResult::new(dry_run);

    let mut remote_index: HashMap<String, usize> = HashMap::with_capacity(remote.len());
    for (idx, resource) in remote.iter().enumerate() {
        remote_index.entry(resource.key()).or_insert(idx);
    }

    let mut defined_in: HashMap<String, String> = HashMap::new();
    let mut matched: HashSet<String> = HashSet::new();

    for item in local {
        if item.status().is_error() {
            result.errored.push(item);
            continue;
        }
        let Some(resource) = item.resource() else {
            let message = "item has no content".to_string();
            result.errored.push(item.with_status(Status::error(message)));
            continue;
        };

        let name = item.name().to_string();
        if let Some(first) = defined_in.get(&name) {
            tracing::warn!(key = %name, first = %first, "Duplicate resource key");
            let message = format!("Duplicate key '{}', already defined by {}", name, first);
            let path = item.path().map(|p| p.to_path_buf());
            result
                .errored
                .push(DeploymentItem::failed(name, path, message));
            continue;
        }
        defined_in.insert(
            name.clone(),
            item.path()
                .map(|p| format!("'{}'", p.display()))
                .unwrap_or_else(|| "another item".to_string()),
        );

        match remote_index.get(&name) {
            None => {
                result
                    .created
                    .push(item.with_status(Status::change(ChangeKind::Created)));
            }
            Some(&idx) => {
                matched.insert(name);
                let current = &remote[idx];
                let kind = if resource.content() == current.content() {
                    ChangeKind::Unchanged
                } else {
                    ChangeKind::Updated
                };
                let item = item
                    .with_status(Status::change(kind))
                    .with_counterpart(current.clone());
                match kind {
                    ChangeKind::Updated => result.updated.push(item),
                    _ => result.unchanged.push(item),
                }
            }
        }
    }

    if reconcile {
        for resource in remote {
            let key = resource.key();
            if matched.contains(&key) {
                continue;
            }
            matched.insert(key);
            result
                .deleted
                .push(DeploymentItem::remote(resource).with_status(Status::change(ChangeKind::Deleted)));
        }
    }

    tracing::debug!(summary = %result.summary(), "Reconciled local and remote resources");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        key: String,
        value: String,
    }

    impl Resource for Entry {
        type Content = String;

        fn key(&self) -> String {
            self.key.clone()
        }

        fn content(&self) -> String {
            self.value.clone()
        }
    }

    fn entry(key: &str, value: &str) -> Entry {
        Entry {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn local(key: &str, value: &str) -> DeploymentItem<Entry> {
        DeploymentItem::loaded(entry(key, value), format!("{}.json", key))
    }

    fn names(items: &[DeploymentItem<Entry>]) -> Vec<&str> {
        items.iter().map(|i| i.name()).collect()
    }

    #[test]
    fn test_reconcile_scenario() {
        let result = reconcile(
            vec![local("a", "x"), local("b", "y")],
            vec![entry("b", "y"), entry("c", "z")],
            true,
            false,
        );

        assert_eq!(names(&result.created), vec!["a"]);
        assert_eq!(names(&result.unchanged), vec!["b"]);
        assert_eq!(names(&result.deleted), vec!["c"]);
        assert!(result.updated.is_empty());
        assert!(result.errored.is_empty());
        assert_eq!(result.deleted[0].status().detail, "Deleted");
    }

    #[test]
    fn test_without_reconcile_remote_only_items_are_not_reported() {
        let result = reconcile(
            vec![local("a", "x"), local("b", "y")],
            vec![entry("b", "y"), entry("c", "z")],
            false,
            false,
        );

        assert!(result.deleted.is_empty());
        assert_eq!(names(&result.created), vec!["a"]);
        assert_eq!(names(&result.unchanged), vec!["b"]);
        assert_eq!(result.total(), 2);
    }

    #[test]
    fn test_changed_content_is_updated_with_counterpart() {
        let result = reconcile(vec![local("a", "new")], vec![entry("a", "old")], true, false);

        assert_eq!(names(&result.updated), vec!["a"]);
        let item = &result.updated[0];
        assert_eq!(item.status().detail, "Updated");
        assert_eq!(item.counterpart().unwrap().value, "old");
        assert_eq!(item.resource().unwrap().value, "new");
    }

    #[test]
    fn test_parse_failures_pass_through_to_errored() {
        let broken: DeploymentItem<Entry> =
            DeploymentItem::failed("broken", Some(PathBuf::from("broken.json")), "expected value");
        let result = reconcile(
            vec![local("a", "x"), broken, local("b", "y")],
            vec![entry("b", "y")],
            false,
            false,
        );

        assert_eq!(names(&result.errored), vec!["broken"]);
        assert_eq!(names(&result.created), vec!["a"]);
        assert_eq!(names(&result.unchanged), vec!["b"]);
    }

    #[test]
    fn test_created_preserves_local_order() {
        let result = reconcile(
            vec![local("z", "1"), local("m", "2"), local("a", "3")],
            Vec::new(),
            true,
            false,
        );
        assert_eq!(names(&result.created), vec!["z", "m", "a"]);
    }

    #[test]
    fn test_deleted_preserves_remote_order() {
        let result = reconcile(
            Vec::new(),
            vec![entry("q", "1"), entry("b", "2"), entry("k", "3")],
            true,
            false,
        );
        assert_eq!(names(&result.deleted), vec!["q", "b", "k"]);
    }

    #[test]
    fn test_idempotent_when_in_sync() {
        let result = reconcile(
            vec![local("a", "x"), local("b", "y")],
            vec![entry("a", "x"), entry("b", "y")],
            true,
            false,
        );
        assert!(!result.has_changes());
        assert_eq!(names(&result.unchanged), vec!["a", "b"]);
    }

    #[test]
    fn test_dry_run_produces_same_categories() {
        let build = |dry_run| {
            reconcile(
                vec![local("a", "x"), local("b", "changed")],
                vec![entry("b", "y"), entry("c", "z")],
                true,
                dry_run,
            )
        };
        let wet = build(false);
        let dry = build(true);

        assert!(dry.dry_run);
        assert_eq!(names(&wet.created), names(&dry.created));
        assert_eq!(names(&wet.updated), names(&dry.updated));
        assert_eq!(names(&wet.deleted), names(&dry.deleted));
        assert_eq!(names(&wet.unchanged), names(&dry.unchanged));
    }

    #[test]
    fn test_duplicate_local_key_first_wins() {
        let first = DeploymentItem::loaded(entry("a", "x"), "one.json");
        let second = DeploymentItem::loaded(entry("a", "y"), "two.json");
        let result = reconcile(vec![first, second], Vec::new(), false, false);

        assert_eq!(result.created.len(), 1);
        assert_eq!(result.created[0].path().unwrap(), PathBuf::from("one.json"));
        assert_eq!(result.errored.len(), 1);
        assert_eq!(result.errored[0].path().unwrap(), PathBuf::from("two.json"));
        assert!(result.errored[0].status().detail.contains("one.json"));
    }

    #[test]
    fn test_every_item_lands_in_exactly_one_group() {
        let broken: DeploymentItem<Entry> = DeploymentItem::failed("e", None, "bad");
        let result = reconcile(
            vec![local("a", "1"), local("b", "2"), broken, local("c", "3")],
            vec![entry("b", "2"), entry("c", "changed"), entry("d", "4")],
            true,
            false,
        );

        let mut all: Vec<&str> = [
            &result.created,
            &result.updated,
            &result.deleted,
            &result.unchanged,
            &result.errored,
        ]
        .iter()
        .flat_map(|items| names(items))
        .collect();
        all.sort();
        assert_eq!(all, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_mark_failed_moves_items_to_errored() {
        let mut result = reconcile(
            vec![local("a", "x"), local("b", "y")],
            Vec::new(),
            false,
            false,
        );
        let mut apply = ApplyResult::new();
        apply.add_success("a", ChangeKind::Created);
        apply.add_failure("b", ChangeKind::Created, "quota exceeded".to_string());

        result.mark_failed(&apply.failed);

        assert_eq!(names(&result.created), vec!["a"]);
        assert_eq!(names(&result.errored), vec!["b"]);
        assert_eq!(result.errored[0].status().detail, "quota exceeded");
    }

    #[test]
    fn test_report_labels() {
        let result = reconcile(
            vec![local("a", "x")],
            vec![entry("c", "z")],
            true,
            true,
        );
        let report = result.report("Remote Config");

        assert_eq!(report.service, "Remote Config");
        assert!(report.dry_run);
        assert_eq!(report.created, vec!["'a' in 'a.json'".to_string()]);
        assert_eq!(report.deleted, vec!["c".to_string()]);
    }

    #[test]
    fn test_summary_display() {
        let result = reconcile(vec![local("a", "x")], Vec::new(), false, true);
        assert_eq!(
            result.summary().to_string(),
            "1 to create, 0 to update, 0 to delete, 0 unchanged, 0 failed"
        );
    }
}
