//! Local resource loading

use crate::cancel::cancellable;
use crate::error::Result;
use crate::item::{DeploymentItem, Resource};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Maximum number of files read at the same time
pub const MAX_CONCURRENT_READS: usize = 8;

/// Parses local files into deployment items.
///
/// Reading never fails: a file that cannot be read or parsed yields a
/// single item with an error status, so one bad file does not abort the
/// batch. A file may define several resources.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    type Resource: Resource;

    async fn read_resources(&self, path: &Path) -> Vec<DeploymentItem<Self::Resource>>;
}

/// Read every file with a bounded fan-out, keeping the input order.
pub async fn load_all<L>(
    loader: &L,
    paths: &[PathBuf],
    cancel: &CancellationToken,
) -> Result<Vec<DeploymentItem<L::Resource>>>
where
    L: ResourceLoader + ?Sized,
{
    let reads = stream::iter(paths.iter().cloned())
        .map(|path| async move { loader.read_resources(&path).await })
        .buffered(MAX_CONCURRENT_READS)
        .collect::<Vec<_>>();

    let loaded = cancellable(cancel, async { Ok(reads.await) }).await?;
    let items: Vec<_> = loaded.into_iter().flatten().collect();

    tracing::debug!(
        files = paths.len(),
        items = items.len(),
        "Loaded local resources"
    );
    Ok(items)
}

/// Item name used when a file fails to load: the file name without extension
pub fn fallback_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::time::Duration;

    #[derive(Debug, Clone)]
    struct Line(String);

    impl Resource for Line {
        type Content = String;

        fn key(&self) -> String {
            self.0.clone()
        }

        fn content(&self) -> String {
            self.0.clone()
        }
    }

    struct LineLoader;

    #[async_trait]
    impl ResourceLoader for LineLoader {
        type Resource = Line;

        async fn read_resources(&self, path: &Path) -> Vec<DeploymentItem<Line>> {
            match tokio::fs::read_to_string(path).await {
                Ok(content) => content
                    .lines()
                    .map(|l| DeploymentItem::loaded(Line(l.to_string()), path))
                    .collect(),
                Err(e) => vec![DeploymentItem::failed(
                    fallback_name(path),
                    Some(path.to_path_buf()),
                    e.to_string(),
                )],
            }
        }
    }

    struct SlowLoader;

    #[async_trait]
    impl ResourceLoader for SlowLoader {
        type Resource = Line;

        async fn read_resources(&self, _path: &Path) -> Vec<DeploymentItem<Line>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Vec::new()
        }
    }

    #[tokio::test]
    async fn test_load_all_keeps_order_and_flattens() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        std::fs::write(&first, "a\nb").unwrap();
        std::fs::write(&second, "c").unwrap();

        let items = load_all(&LineLoader, &[first, second], &CancellationToken::new())
            .await
            .unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_unreadable_file_becomes_error_item() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        let items = load_all(&LineLoader, &[missing], &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name(), "missing");
        assert!(items[0].status().is_error());
    }

    #[tokio::test]
    async fn test_load_all_stops_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = load_all(&SlowLoader, &[PathBuf::from("a")], &cancel).await;
        assert!(matches!(result, Err(CoreError::Cancelled)));
    }

    #[test]
    fn test_fallback_name() {
        assert_eq!(fallback_name(Path::new("configs/audio.rc")), "audio");
    }
}
