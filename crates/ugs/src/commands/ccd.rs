use crate::context::{GlobalOptions, Session};
use crate::error::CliError;
use crate::progress::Loading;
use crate::utils::Output;
use std::path::PathBuf;
use ugs_ccd::CcdClient;
use ugs_core::CancellationToken;

pub async fn list_buckets(
    options: &GlobalOptions,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let session = Session::resolve(options)?;
    let buckets = {
        let _loading = Loading::start("Fetching buckets...", output.quiet || output.json);
        let target = session.target(cancel).await?;
        CcdClient::new(session.gateway.clone())
            .list_buckets(&target, cancel)
            .await?
    };
    output.records(&buckets)
}

pub async fn list_entries(
    options: &GlobalOptions,
    bucket_name: &str,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let session = Session::resolve(options)?;
    let entries = {
        let _loading = Loading::start("Fetching entries...", output.quiet || output.json);
        let target = session.target(cancel).await?;
        let client = CcdClient::new(session.gateway.clone());
        let bucket_id = client
            .bucket_id_by_name(&target, bucket_name, cancel)
            .await?;
        client.list_entries(&target, &bucket_id, cancel).await?
    };
    output.records(&entries)
}

/// Local file an entry is written to when `--output` is omitted
fn default_output(entry_path: &str) -> Result<PathBuf, CliError> {
    entry_path
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| CliError::handled(format!("Invalid entry path '{}'", entry_path)))
}

pub async fn download_entry(
    options: &GlobalOptions,
    bucket_name: &str,
    entry_path: &str,
    version_id: Option<&str>,
    dest: Option<PathBuf>,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let dest = match dest {
        Some(dest) => dest,
        None => default_output(entry_path)?,
    };

    let session = Session::resolve(options)?;
    let written = {
        let _loading = Loading::start("Downloading entry...", output.quiet);
        let target = session.target(cancel).await?;
        CcdClient::new(session.gateway.clone())
            .download_entry(&target, bucket_name, entry_path, version_id, &dest, cancel)
            .await?
    };

    output.info(format!(
        "Downloaded '{}' to '{}' ({} bytes)",
        entry_path,
        dest.display(),
        written
    ));
    Ok(())
}
