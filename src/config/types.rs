//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::{DeploySettings, FailoverSettings};
use crate::domain::entities::{PromotionCheck, NOT_A_SLAVE_RESPONSE};
use crate::error::DeployResult;
use crate::infrastructure::node::NodeCommands;
use crate::infrastructure::remote::SshOptions;

use super::loader::{self, ConfigWarning};

/// Where clusters live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Cluster root, identical on every host; `~` expands locally
    pub base_directory: PathBuf,
    /// Local tool state; defaults to `~/.kvdeploy`
    pub cli_root: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("~/tsr2"),
            cli_root: None,
        }
    }
}

/// Which tool copies trees to hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransferTool {
    #[default]
    Auto,
    Rsync,
    Scp,
}

/// SSH connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub user: Option<String>,
    pub port: Option<u16>,
    pub connect_timeout_secs: u64,
    /// 0 disables the deadline
    pub command_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
    pub transfer: TransferTool,
    pub extra_args: Vec<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            user: None,
            port: None,
            connect_timeout_secs: 10,
            command_timeout_secs: 600,
            transfer_timeout_secs: 600,
            transfer: TransferTool::Auto,
            extra_args: Vec::new(),
        }
    }
}

fn optional_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl RemoteConfig {
    pub fn ssh_options(&self) -> SshOptions {
        SshOptions {
            user: self.user.clone(),
            port: self.port,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            command_timeout: optional_secs(self.command_timeout_secs),
            transfer_timeout: optional_secs(self.transfer_timeout_secs),
            extra_args: self.extra_args.clone(),
        }
    }
}

/// Deploy workflow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// 0 runs one worker per host
    pub max_parallel_hosts: usize,
    pub install_command: String,
    pub node_up_timeout_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        let defaults = DeploySettings::default();
        Self {
            max_parallel_hosts: defaults.max_parallel_hosts,
            install_command: defaults.install_command,
            node_up_timeout_secs: defaults.node_up_timeout.as_secs(),
        }
    }
}

/// Failover retry protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FailoverConfig {
    pub max_rounds: u32,
    pub round_delay_secs: u64,
    pub timeout_key: String,
    pub widened_timeout: String,
    pub promoted_response: String,
    pub check: PromotionCheck,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            round_delay_secs: 5,
            timeout_key: "cluster-node-timeout".to_string(),
            widened_timeout: "2000".to_string(),
            promoted_response: NOT_A_SLAVE_RESPONSE.to_string(),
            check: PromotionCheck::Response,
        }
    }
}

impl FailoverConfig {
    pub fn settings(&self) -> FailoverSettings {
        FailoverSettings {
            max_rounds: self.max_rounds.max(1),
            round_delay: Duration::from_secs(self.round_delay_secs),
            timeout_key: self.timeout_key.clone(),
            widened_timeout: self.widened_timeout.clone(),
            promoted_response: self.promoted_response.clone(),
            check: self.check,
        }
    }
}

/// Node command templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub cli: String,
    pub start: String,
    pub stop: String,
    pub configure: String,
    pub reset: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let NodeCommands {
            cli,
            start,
            stop,
            configure,
            reset,
        } = NodeCommands::default();
        Self {
            cli,
            start,
            stop,
            configure,
            reset,
        }
    }
}

impl NodeConfig {
    pub fn commands(&self) -> NodeCommands {
        NodeCommands {
            cli: self.cli.clone(),
            start: self.start.clone(),
            stop: self.stop.clone(),
            configure: self.configure.clone(),
            reset: self.reset.clone(),
        }
    }
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub color: ColorMode,
    pub unicode: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
            unicode: true,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub remote: RemoteConfig,
    pub deploy: DeployConfig,
    pub failover: FailoverConfig,
    pub node: NodeConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> DeployResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> DeployResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Resolve from `--config`, `$KVDEPLOY_CONFIG`, the user config or defaults
    pub fn discover(explicit: Option<&Path>) -> DeployResult<(Self, Vec<ConfigWarning>)> {
        loader::discover(explicit)
    }

    /// Apply environment variable overrides (KVDEPLOY_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Workflow settings; `owner` and `hostname` go into lock records
    pub fn deploy_settings(&self, owner: &str, hostname: &str) -> DeploySettings {
        let cli_root = self
            .paths
            .cli_root
            .as_deref()
            .map(loader::expand_home)
            .or_else(crate::infrastructure::fs::kvdeploy_dir)
            .unwrap_or_else(|| PathBuf::from(".kvdeploy"));
        DeploySettings {
            base_directory: loader::expand_home(&self.paths.base_directory),
            cli_root,
            max_parallel_hosts: self.deploy.max_parallel_hosts,
            install_command: self.deploy.install_command.clone(),
            node_up_timeout: Duration::from_secs(self.deploy.node_up_timeout_secs),
            owner: owner.to_string(),
            hostname: hostname.to_string(),
            failover: self.failover.settings(),
        }
    }
}
