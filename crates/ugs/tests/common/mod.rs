use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const PROJECT_ID: &str = "proj";
pub const ENVIRONMENT_NAME: &str = "production";
pub const ENVIRONMENT_ID: &str = "env-id";

/// Isolated working area: a configuration file and resource files in a temp dir
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("cli-config.json")
    }

    /// Write the CLI configuration with the standard project and environment
    #[allow(dead_code)]
    pub fn write_config(&self, services_url: &str) {
        let config = serde_json::json!({
            "project-id": PROJECT_ID,
            "environment-name": ENVIRONMENT_NAME,
            "services-url": services_url,
        });
        fs::write(self.config_path(), config.to_string()).unwrap();
    }

    #[allow(dead_code)]
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// `ugs` isolated from the caller's environment, without credentials
    pub fn command(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("ugs").unwrap();
        cmd.current_dir(self.root.path())
            .env("UGS_CLI_CONFIG_PATH", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("UGS_CLI_PROJECT_ID")
            .env_remove("UGS_CLI_ENVIRONMENT_NAME")
            .env_remove("UGS_CLI_SERVICES_URL")
            .env_remove("UGS_CLI_SERVICE_KEY_ID")
            .env_remove("UGS_CLI_SERVICE_SECRET_KEY")
            .env_remove("RUST_LOG");
        cmd
    }

    /// `ugs` with service account credentials
    #[allow(dead_code)]
    pub fn logged_in_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.env("UGS_CLI_SERVICE_KEY_ID", "key")
            .env("UGS_CLI_SERVICE_SECRET_KEY", "secret");
        cmd
    }
}
