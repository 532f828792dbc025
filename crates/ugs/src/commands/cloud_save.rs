use crate::context::{GlobalOptions, Session};
use crate::progress::Loading;
use crate::utils::Output;
use ugs_cloud_save::{CloudSaveClient, CreateIndexInput};
use ugs_core::CancellationToken;

pub async fn list_indexes(
    options: &GlobalOptions,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let session = Session::resolve(options)?;
    let indexes = {
        let _loading = Loading::start("Fetching indexes...", output.quiet || output.json);
        let target = session.target(cancel).await?;
        CloudSaveClient::new(session.gateway.clone())
            .list_indexes(&target, cancel)
            .await?
    };
    output.records(&indexes)
}

/// Create an index over player data, or custom entity data when `custom` is set
pub async fn create_index(
    options: &GlobalOptions,
    input: CreateIndexInput,
    custom: bool,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    // Validated before any network call
    let (visibility, body) = input.parse()?;

    let session = Session::resolve(options)?;
    let response = {
        let _loading = Loading::start("Creating index...", output.quiet || output.json);
        let target = session.target(cancel).await?;
        let client = CloudSaveClient::new(session.gateway.clone());
        if custom {
            client.create_custom_index(&target, &body, cancel).await?
        } else {
            client
                .create_player_index(&target, visibility, &body, cancel)
                .await?
        }
    };

    if output.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        output.info(format!(
            "Index '{}' created (status: {})",
            response.id, response.status
        ));
    }
    Ok(())
}
