use crate::context::{GlobalOptions, Session};
use crate::progress::Loading;
use crate::utils::Output;
use ugs_core::CancellationToken;
use ugs_remote_config::RemoteConfigClient;

/// Print the settings of the environment
pub async fn list(
    options: &GlobalOptions,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let session = Session::resolve(options)?;
    let settings = {
        let _loading = Loading::start("Fetching settings...", output.quiet || output.json);
        let target = session.target(cancel).await?;
        RemoteConfigClient::new(session.gateway.clone())
            .get_settings(&target, cancel)
            .await?
    };

    let entries = settings.map(|s| s.value).unwrap_or_default();
    output.records(&entries)
}
