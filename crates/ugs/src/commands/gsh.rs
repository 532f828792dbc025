use crate::context::{GlobalOptions, Session};
use crate::progress::Loading;
use crate::utils::Output;
use std::path::Path;
use ugs_core::CancellationToken;
use ugs_gsh::{FilesListInput, GshClient, parse_server_id};

pub async fn list_files(
    options: &GlobalOptions,
    input: FilesListInput,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let request = input.into_request()?;

    let session = Session::resolve(options)?;
    let files = {
        let _loading = Loading::start("Fetching files list...", output.quiet || output.json);
        let target = session.target(cancel).await?;
        GshClient::new(session.gateway.clone())
            .list_files(&target, &request, cancel)
            .await?
    };
    output.records(&files)
}

pub async fn download_file(
    options: &GlobalOptions,
    server_id: &str,
    path: &str,
    dest: &Path,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let server_id = parse_server_id(server_id)?;

    let session = Session::resolve(options)?;
    let written = {
        let _loading = Loading::start("Downloading file...", output.quiet);
        let target = session.target(cancel).await?;
        GshClient::new(session.gateway.clone())
            .download_file(&target, server_id, path, dest, cancel)
            .await?
    };

    output.info(format!(
        "Downloaded '{}' to '{}' ({} bytes)",
        path,
        dest.display(),
        written
    ));
    Ok(())
}
