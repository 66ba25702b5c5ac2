//! Workflow settings resolved from configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::entities::{ClusterPaths, PromotionCheck, NOT_A_SLAVE_RESPONSE};
use crate::domain::value_objects::ClusterId;

/// Knobs shared by every workflow
#[derive(Debug, Clone)]
pub struct DeploySettings {
    /// Cluster root on every host
    pub base_directory: PathBuf,
    /// Local tool state (conf archives, locks)
    pub cli_root: PathBuf,
    /// Concurrent per-host workers in a phase; 0 means one per host
    pub max_parallel_hosts: usize,
    /// Install command template; `{installer}` and `{cluster_path}` are substituted
    pub install_command: String,
    /// How long restarted nodes get to answer
    pub node_up_timeout: Duration,
    /// Recorded in the cluster lock
    pub owner: String,
    pub hostname: String,
    pub failover: FailoverSettings,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("tsr2"),
            cli_root: PathBuf::from(".kvdeploy"),
            max_parallel_hosts: 0,
            install_command: "sh {installer} --full {cluster_path}".to_string(),
            node_up_timeout: Duration::from_secs(60),
            owner: "kvdeploy".to_string(),
            hostname: "localhost".to_string(),
            failover: FailoverSettings::default(),
        }
    }
}

impl DeploySettings {
    pub fn paths(&self, cluster_id: ClusterId) -> ClusterPaths {
        ClusterPaths::new(&self.base_directory, &self.cli_root, cluster_id)
    }

    pub fn render_install_command(&self, installer: &Path, paths: &ClusterPaths) -> String {
        self.install_command
            .replace("{installer}", &installer.to_string_lossy())
            .replace("{cluster_path}", &paths.cluster_path.to_string_lossy())
    }
}

/// Failover retry protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailoverSettings {
    pub max_rounds: u32,
    pub round_delay: Duration,
    /// Node-liveness key widened around the failover
    pub timeout_key: String,
    pub widened_timeout: String,
    /// Reply meaning "already promoted"
    pub promoted_response: String,
    pub check: PromotionCheck,
}

impl Default for FailoverSettings {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            round_delay: Duration::from_secs(5),
            timeout_key: "cluster-node-timeout".to_string(),
            widened_timeout: "2000".to_string(),
            promoted_response: NOT_A_SLAVE_RESPONSE.to_string(),
            check: PromotionCheck::Response,
        }
    }
}
