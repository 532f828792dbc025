pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Overrides the location of the configuration file
pub const CONFIG_PATH_ENV: &str = "UGS_CLI_CONFIG_PATH";
pub const SERVICE_KEY_ID_ENV: &str = "UGS_CLI_SERVICE_KEY_ID";
pub const SERVICE_SECRET_KEY_ENV: &str = "UGS_CLI_SERVICE_SECRET_KEY";

/// Keys stored in the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ProjectId,
    EnvironmentName,
    ServicesUrl,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::ProjectId,
        ConfigKey::EnvironmentName,
        ConfigKey::ServicesUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ProjectId => "project-id",
            ConfigKey::EnvironmentName => "environment-name",
            ConfigKey::ServicesUrl => "services-url",
        }
    }

    /// Environment variable overriding the file value
    pub fn env_var(&self) -> &'static str {
        match self {
            ConfigKey::ProjectId => "UGS_CLI_PROJECT_ID",
            ConfigKey::EnvironmentName => "UGS_CLI_ENVIRONMENT_NAME",
            ConfigKey::ServicesUrl => "UGS_CLI_SERVICES_URL",
        }
    }

    fn validate(&self, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: self.as_str().to_string(),
                reason: "value cannot be empty".to_string(),
            });
        }
        if *self == ConfigKey::ServicesUrl
            && !(value.starts_with("http://") || value.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                key: self.as_str().to_string(),
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services_url: Option<String>,
}

impl Config {
    /// Load the configuration from its default location
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load the configuration from `path`; a missing file is an empty config
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No configuration file");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn slot(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::ProjectId => &mut self.project_id,
            ConfigKey::EnvironmentName => &mut self.environment_name,
            ConfigKey::ServicesUrl => &mut self.services_url,
        }
    }

    /// Value stored in the file
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::ProjectId => self.project_id.as_deref(),
            ConfigKey::EnvironmentName => self.environment_name.as_deref(),
            ConfigKey::ServicesUrl => self.services_url.as_deref(),
        }
    }

    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        key.validate(&value)?;
        *self.slot(key) = Some(value);
        Ok(())
    }

    /// Remove a key, returning whether it was set
    pub fn unset(&mut self, key: ConfigKey) -> bool {
        self.slot(key).take().is_some()
    }

    /// Effective value of `key`.
    ///
    /// Precedence: command-line flag, then environment variable, then file.
    /// Empty values count as unset.
    pub fn resolve(&self, key: ConfigKey, flag: Option<&str>) -> Option<String> {
        flag.filter(|v| !v.trim().is_empty())
            .map(str::to_string)
            .or_else(|| non_empty_env(key.env_var()))
            .or_else(|| {
                self.get(key)
                    .filter(|v| !v.trim().is_empty())
                    .map(str::to_string)
            })
    }
}

/// Service account key read from the environment
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceKey {
    pub key_id: String,
    pub secret: String,
}

impl ServiceKey {
    /// `None` unless both the key id and the secret are set
    pub fn from_env() -> Option<Self> {
        Some(Self {
            key_id: non_empty_env(SERVICE_KEY_ID_ENV)?,
            secret: non_empty_env(SERVICE_SECRET_KEY_ENV)?,
        })
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceKey")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Location of the configuration file.
///
/// 1. `UGS_CLI_CONFIG_PATH`
/// 2. `<config dir>/ugs/config.json`
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = non_empty_env(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(config_dir.join("ugs").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_key_parsing() {
        assert_eq!(
            "environment-name".parse::<ConfigKey>().unwrap(),
            ConfigKey::EnvironmentName
        );
        assert!(matches!(
            "color".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/config.json");

        let mut config = Config::default();
        config.set(ConfigKey::ProjectId, "abc-123").unwrap();
        config.save_to(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"project-id\""));
        assert!(!raw.contains("environment-name"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.get(ConfigKey::ProjectId), Some("abc-123"));
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&temp_dir.path().join("none.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();
        assert!(config.set(ConfigKey::ServicesUrl, "ftp://nope").is_err());
        assert!(config.set(ConfigKey::EnvironmentName, "  ").is_err());
        assert!(config.set(ConfigKey::ServicesUrl, "http://localhost:8080").is_ok());
        assert!(config.unset(ConfigKey::ServicesUrl));
        assert!(!config.unset(ConfigKey::ServicesUrl));
    }

    #[test]
    #[serial]
    fn test_resolve_precedence() {
        let config = Config {
            project_id: Some("from-file".to_string()),
            ..Default::default()
        };

        temp_env::with_var("UGS_CLI_PROJECT_ID", Some("from-env"), || {
            assert_eq!(
                config.resolve(ConfigKey::ProjectId, Some("from-flag")).as_deref(),
                Some("from-flag")
            );
            assert_eq!(
                config.resolve(ConfigKey::ProjectId, None).as_deref(),
                Some("from-env")
            );
        });

        temp_env::with_var_unset("UGS_CLI_PROJECT_ID", || {
            assert_eq!(
                config.resolve(ConfigKey::ProjectId, None).as_deref(),
                Some("from-file")
            );
            assert_eq!(config.resolve(ConfigKey::EnvironmentName, None), None);
        });
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/tmp/custom-ugs.json"), || {
            assert_eq!(
                config_path().unwrap(),
                PathBuf::from("/tmp/custom-ugs.json")
            );
        });
    }

    #[test]
    #[serial]
    fn test_service_key_requires_both_parts() {
        temp_env::with_vars(
            [
                (SERVICE_KEY_ID_ENV, Some("id")),
                (SERVICE_SECRET_KEY_ENV, None::<&str>),
            ],
            || assert!(ServiceKey::from_env().is_none()),
        );

        temp_env::with_vars(
            [
                (SERVICE_KEY_ID_ENV, Some("id")),
                (SERVICE_SECRET_KEY_ENV, Some("secret")),
            ],
            || {
                let key = ServiceKey::from_env().unwrap();
                assert_eq!(key.key_id, "id");
                assert!(!format!("{:?}", key).contains("secret"));
            },
        );
    }
}
