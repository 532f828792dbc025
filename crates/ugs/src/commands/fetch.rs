use crate::context::{GlobalOptions, Session};
use crate::error::CliError;
use crate::progress::Loading;
use crate::utils::Output;
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use ugs_core::{CancellationToken, CoreError, FetchInput, FetchService};

/// Services that take part in a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceKind {
    CloudSave,
    RemoteConfig,
    Ccd,
}

#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub path: PathBuf,
    pub dry_run: bool,
    pub reconcile: bool,
    pub services: Vec<ServiceKind>,
    pub ccd_bucket: Option<String>,
}

/// Services to run, in a stable order without duplicates.
///
/// Without an explicit selection every file-based service runs; CCD joins
/// when a bucket is given.
pub fn selected_services(args: &FetchArgs) -> Vec<ServiceKind> {
    let requested: Vec<ServiceKind> = if args.services.is_empty() {
        let mut all = vec![ServiceKind::CloudSave, ServiceKind::RemoteConfig];
        if args.ccd_bucket.is_some() {
            all.push(ServiceKind::Ccd);
        }
        all
    } else {
        args.services.clone()
    };

    let mut selected = Vec::with_capacity(requested.len());
    for kind in requested {
        if !selected.contains(&kind) {
            selected.push(kind);
        }
    }
    selected
}

/// Directory the CCD entries are read from
fn ccd_root(path: &Path) -> PathBuf {
    if path.is_file() {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    } else {
        path.to_path_buf()
    }
}

fn build_services(
    session: &Session,
    args: &FetchArgs,
) -> Result<Vec<Box<dyn FetchService>>, CliError> {
    let mut services: Vec<Box<dyn FetchService>> = Vec::new();
    for kind in selected_services(args) {
        match kind {
            ServiceKind::CloudSave => {
                services.push(Box::new(ugs_cloud_save::fetcher(session.gateway.clone())));
            }
            ServiceKind::RemoteConfig => {
                services.push(Box::new(ugs_remote_config::fetcher(session.gateway.clone())));
            }
            ServiceKind::Ccd => {
                let bucket = args.ccd_bucket.as_deref().ok_or_else(|| {
                    CliError::handled("--ccd-bucket is required to fetch Cloud Content Delivery")
                })?;
                services.push(Box::new(ugs_ccd::fetcher(
                    session.gateway.clone(),
                    bucket,
                    ccd_root(&args.path),
                )));
            }
        }
    }
    Ok(services)
}

pub async fn handle(
    options: &GlobalOptions,
    args: FetchArgs,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    if !args.path.exists() {
        return Err(CliError::handled(format!(
            "Path '{}' does not exist",
            args.path.display()
        ))
        .into());
    }

    let session = Session::resolve(options)?;
    let services = build_services(&session, &args)?;
    let silent = output.quiet || output.json;

    let target = {
        let _loading = Loading::start("Resolving environment...", silent);
        session.target(cancel).await?
    };

    let input = FetchInput::new(&args.path)
        .dry_run(args.dry_run)
        .reconcile(args.reconcile);

    let mut reports = Vec::with_capacity(services.len());
    let mut failures = Vec::new();
    for service in &services {
        let loading = Loading::start(&format!("Fetching {}...", service.service_name()), silent);
        let outcome = service.fetch_report(&input, &target, &loading, cancel).await;
        drop(loading);

        match outcome {
            Ok(report) => reports.push(report),
            Err(CoreError::Cancelled) => break,
            Err(e) => {
                tracing::warn!(service = service.service_name(), error = %e, "Fetch failed");
                failures.push(CliError::for_service(service.service_name(), &e));
            }
        }
    }

    // Changes applied before an interrupt are still reported
    output.reports(&reports)?;
    if cancel.is_cancelled() {
        return Err(CliError::Cancelled.into());
    }

    if let Some(last) = failures.pop() {
        for failure in &failures {
            eprintln!("{}", failure);
        }
        return Err(last.into());
    }

    let failed: usize = reports.iter().map(|r| r.errors.len()).sum();
    if failed > 0 {
        return Err(CliError::handled(format!("{} item(s) could not be fetched", failed)).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(services: Vec<ServiceKind>, ccd_bucket: Option<&str>) -> FetchArgs {
        FetchArgs {
            path: PathBuf::from("."),
            dry_run: true,
            reconcile: false,
            services,
            ccd_bucket: ccd_bucket.map(str::to_string),
        }
    }

    #[test]
    fn test_default_services() {
        assert_eq!(
            selected_services(&args(vec![], None)),
            vec![ServiceKind::CloudSave, ServiceKind::RemoteConfig]
        );
        assert_eq!(
            selected_services(&args(vec![], Some("assets"))),
            vec![
                ServiceKind::CloudSave,
                ServiceKind::RemoteConfig,
                ServiceKind::Ccd
            ]
        );
    }

    #[test]
    fn test_explicit_services_are_deduplicated() {
        let selected = selected_services(&args(
            vec![
                ServiceKind::RemoteConfig,
                ServiceKind::RemoteConfig,
                ServiceKind::CloudSave,
            ],
            None,
        ));
        assert_eq!(
            selected,
            vec![ServiceKind::RemoteConfig, ServiceKind::CloudSave]
        );
    }

    #[test]
    fn test_ccd_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("logo.png");
        std::fs::write(&file, b"png").unwrap();

        assert_eq!(ccd_root(dir.path()), dir.path());
        assert_eq!(ccd_root(&file), dir.path());
    }
}
