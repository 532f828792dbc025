//! Command failures and their exit codes

use std::fmt::{self, Display, Formatter};
use ugs_ccd::CcdError;
use ugs_cloud_save::CloudSaveError;
use ugs_config::ConfigError;
use ugs_core::CoreError;
use ugs_gsh::GshError;
use ugs_remote_config::RemoteConfigError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_HANDLED: i32 = 1;
pub const EXIT_UNHANDLED: i32 = 3;
pub const EXIT_NOT_FOUND: i32 = 4;
pub const EXIT_CANCELLED: i32 = 130;

/// CLI-level error distinguishing expected failures from bugs
#[derive(Debug)]
pub enum CliError {
    /// Expected failure: bad input, missing configuration, service error
    Handled(String),
    NotFound(String),
    Cancelled,
    Unhandled(anyhow::Error),
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn handled(message: impl Into<String>) -> Self {
        Self::Handled(message.into())
    }

    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Handled(_) => EXIT_HANDLED,
            Self::NotFound(_) => EXIT_NOT_FOUND,
            Self::Cancelled => EXIT_CANCELLED,
            Self::Unhandled(_) => EXIT_UNHANDLED,
        }
    }

    pub fn display_message(&self) -> String {
        match self {
            Self::Handled(message) => message.clone(),
            Self::NotFound(message) => message.clone(),
            Self::Cancelled => "Operation cancelled".to_string(),
            Self::Unhandled(error) => format!("An unexpected error occurred: {error:#}"),
        }
    }

    /// Classify an error raised while running a command
    pub fn classify(error: anyhow::Error) -> Self {
        let error = match error.downcast::<CliError>() {
            Ok(cli) => return cli,
            Err(error) => error,
        };

        let classified = error.chain().find_map(|cause| {
            if let Some(core) = cause.downcast_ref::<CoreError>() {
                return Some(Self::from_core(core));
            }
            if let Some(e) = cause.downcast_ref::<CloudSaveError>() {
                return Some(match e {
                    CloudSaveError::Core(core) => Self::from_core(core),
                    other => Self::Handled(other.to_string()),
                });
            }
            if let Some(e) = cause.downcast_ref::<RemoteConfigError>() {
                return Some(match e {
                    RemoteConfigError::Core(core) => Self::from_core(core),
                    other => Self::Handled(other.to_string()),
                });
            }
            if let Some(e) = cause.downcast_ref::<CcdError>() {
                return Some(match e {
                    CcdError::Core(core) => Self::from_core(core),
                    other => Self::Handled(other.to_string()),
                });
            }
            if let Some(e) = cause.downcast_ref::<GshError>() {
                return Some(match e {
                    GshError::Core(core) => Self::from_core(core),
                    other => Self::Handled(other.to_string()),
                });
            }
            cause
                .downcast_ref::<ConfigError>()
                .map(|e| Self::Handled(e.to_string()))
        });

        classified.unwrap_or(Self::Unhandled(error))
    }

    /// Failure of one service in a command spanning several services
    pub fn for_service(service: &str, error: &CoreError) -> Self {
        match Self::from_core(error) {
            Self::Handled(message) => Self::Handled(format!("{}: {}", service, message)),
            Self::NotFound(message) => Self::NotFound(format!("{}: {}", service, message)),
            other => other,
        }
    }

    fn from_core(error: &CoreError) -> Self {
        match error {
            CoreError::NotFound(_) => Self::NotFound(error.to_string()),
            CoreError::Cancelled => Self::Cancelled,
            other => Self::Handled(other.to_string()),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::handled("x").exit_code(), 1);
        assert_eq!(CliError::NotFound("x".into()).exit_code(), 4);
        assert_eq!(CliError::Cancelled.exit_code(), 130);
        assert_eq!(CliError::Unhandled(anyhow::anyhow!("x")).exit_code(), 3);
    }

    #[test]
    fn test_classify_core_errors() {
        let not_found = CliError::classify(CoreError::NotFound("bucket 'x'".into()).into());
        assert_eq!(not_found.exit_code(), EXIT_NOT_FOUND);
        assert_eq!(not_found.display_message(), "Not found: bucket 'x'");

        let api = CliError::classify(
            CoreError::Api {
                status: 500,
                message: "boom".into(),
            }
            .into(),
        );
        assert_eq!(api.exit_code(), EXIT_HANDLED);

        assert_eq!(
            CliError::classify(CoreError::Cancelled.into()).exit_code(),
            EXIT_CANCELLED
        );
    }

    #[test]
    fn test_classify_wrapped_errors() {
        let wrapped = CliError::classify(
            CloudSaveError::Core(CoreError::NotFound("index".into())).into(),
        );
        assert_eq!(wrapped.exit_code(), EXIT_NOT_FOUND);

        let validation =
            CliError::classify(CloudSaveError::InvalidInput("bad visibility".into()).into());
        assert_eq!(validation.exit_code(), EXIT_HANDLED);

        let contextual =
            CliError::classify(anyhow::Error::new(CoreError::Cancelled).context("while fetching"));
        assert_eq!(contextual.exit_code(), EXIT_CANCELLED);
    }

    #[test]
    fn test_service_failure_is_prefixed() {
        let error = CliError::for_service("CCD", &CoreError::NotFound("bucket 'b'".into()));
        assert_eq!(error.exit_code(), EXIT_NOT_FOUND);
        assert_eq!(error.display_message(), "CCD: Not found: bucket 'b'");
    }

    #[test]
    fn test_unknown_error_is_unhandled() {
        let error = CliError::classify(anyhow::anyhow!("index out of range"));
        assert_eq!(error.exit_code(), EXIT_UNHANDLED);
        assert!(error.display_message().contains("unexpected"));
    }

    #[test]
    fn test_cli_error_passes_through() {
        let error = CliError::classify(CliError::handled("Project Id is missing").into());
        assert_eq!(error.display_message(), "Project Id is missing");
    }
}
