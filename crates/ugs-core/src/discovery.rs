//! Local resource file discovery

use crate::error::{CoreError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Collect the files a fetch should read.
///
/// `path` may be a single file or a directory walked recursively. Only files
/// whose extension is in `extensions` are kept; an empty filter keeps every
/// file. Results are sorted alphabetically.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn discover_files(path: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(CoreError::NotFound(format!(
            "path '{}' does not exist",
            path.display()
        )));
    }

    if path.is_file() {
        return Ok(if has_extension(path, extensions) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut files = Vec::new();
    let mut visited = HashSet::new();
    visit_dir(path, extensions, &mut files, &mut visited)?;
    files.sort();

    debug!(count = files.len(), "Discovered resource files");
    Ok(files)
}

pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn visit_dir(
    dir: &Path,
    extensions: &[&str],
    files: &mut Vec<PathBuf>,
    visited: &mut HashSet<PathBuf>,
) -> Result<()> {
    let canonical_dir = dir.canonicalize()?;

    // Symlink loops
    if !visited.insert(canonical_dir.clone()) {
        warn!(dir = %canonical_dir.display(), "Symlink loop detected, skipping");
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            visit_dir(&path, extensions, files, visited)?;
        } else if has_extension(&path, extensions) {
            files.push(path);
        }
    }

    Ok(())
}
