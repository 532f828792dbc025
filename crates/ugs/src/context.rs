//! Resolution of credentials, project and environment for service commands

use crate::error::{CliError, CliResult};
use ugs_config::{Config, ConfigKey, ServiceKey};
use ugs_core::{
    CancellationToken, Credentials, DEFAULT_SERVICES_URL, EnvironmentResolver, Gateway, Target,
    UnityEnvironment,
};

pub const NOT_LOGGED_IN: &str = "You are not logged in. Set the UGS_CLI_SERVICE_KEY_ID and \
     UGS_CLI_SERVICE_SECRET_KEY environment variables to a service account key.";
pub const PROJECT_ID_NOT_SET: &str = "Project Id is missing. Set it with '--project-id' or \
     'ugs config set project-id <value>'.";
pub const ENVIRONMENT_NAME_NOT_SET: &str = "Environment name is not set. Set it with \
     '--environment-name' or 'ugs config set environment-name <value>'.";

/// Options shared by every service command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub project_id: Option<String>,
    pub environment_name: Option<String>,
}

/// Everything a service command needs to reach its service
pub struct Session {
    pub gateway: Gateway,
    pub project_id: String,
    environment: UnityEnvironment,
}

impl Session {
    /// Validate the configuration in a fixed order: credentials, project id,
    /// environment name.
    pub fn resolve(options: &GlobalOptions) -> CliResult<Self> {
        let config = Config::load().map_err(|e| CliError::handled(e.to_string()))?;

        let key = ServiceKey::from_env().ok_or_else(|| CliError::handled(NOT_LOGGED_IN))?;
        let project_id = config
            .resolve(ConfigKey::ProjectId, options.project_id.as_deref())
            .ok_or_else(|| CliError::handled(PROJECT_ID_NOT_SET))?;
        let environment_name = config
            .resolve(ConfigKey::EnvironmentName, options.environment_name.as_deref())
            .ok_or_else(|| CliError::handled(ENVIRONMENT_NAME_NOT_SET))?;
        let services_url = config
            .resolve(ConfigKey::ServicesUrl, None)
            .unwrap_or_else(|| DEFAULT_SERVICES_URL.to_string());

        tracing::debug!(%project_id, %environment_name, %services_url, "Resolved session");

        let gateway = Gateway::new(services_url, Credentials::new(key.key_id, key.secret))
            .map_err(|e| CliError::handled(e.to_string()))?;
        let environment =
            UnityEnvironment::new(gateway.clone(), project_id.clone(), Some(environment_name));

        Ok(Self {
            gateway,
            project_id,
            environment,
        })
    }

    /// Project and environment identifier commands run against
    pub async fn target(&self, cancel: &CancellationToken) -> anyhow::Result<Target> {
        let environment_id = self.environment.fetch_identifier(cancel).await?;
        Ok(Target::new(self.project_id.clone(), environment_id))
    }
}
