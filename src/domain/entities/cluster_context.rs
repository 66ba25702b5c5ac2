//! Cluster context: the explicit per-workflow view of one cluster
//!
//! Threaded through every orchestrator call instead of ambient
//! "current cluster" state.

use std::path::{Path, PathBuf};

use crate::domain::entities::port_assignment::PortAssignment;
use crate::domain::entities::properties::{keys, PropertiesDocument};
use crate::domain::value_objects::{ClusterId, Host, NodeAddr, PortSet};
use crate::error::{DeployError, DeployResult};

/// Marker file whose presence means an install is in flight
pub const SENTINEL_FILE: &str = ".deploy.state";
pub const PROPERTIES_FILE: &str = "redis.properties";

/// Filesystem layout of one cluster
///
/// `base_directory` is the same path on every host; conf backups and the
/// advisory lock live under `cli_root` on the orchestrating machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterPaths {
    pub base_directory: PathBuf,
    pub cluster_path: PathBuf,
    pub conf_path: PathBuf,
    pub properties_path: PathBuf,
    pub log_path: PathBuf,
    pub sentinel: PathBuf,
    pub data_backup_root: PathBuf,
    pub conf_backup_root: PathBuf,
    pub lock_path: PathBuf,
}

impl ClusterPaths {
    pub fn new(base_directory: &Path, cli_root: &Path, cluster_id: ClusterId) -> Self {
        let cluster_path = base_directory.join(cluster_id.dir_name());
        let conf_path = cluster_path.join("conf");
        let cluster_meta = cli_root.join("clusters").join(cluster_id.to_string());
        Self {
            base_directory: base_directory.to_path_buf(),
            properties_path: conf_path.join(PROPERTIES_FILE),
            log_path: cluster_path.join("logs"),
            sentinel: cluster_path.join(SENTINEL_FILE),
            data_backup_root: base_directory.join("backup"),
            conf_backup_root: cluster_meta.join("conf_backup"),
            lock_path: cluster_meta.join("deploy.lock"),
            conf_path,
            cluster_path,
        }
    }
}

/// Resolved topology of a deployed cluster
#[derive(Debug, Clone)]
pub struct ClusterContext {
    pub cluster_id: ClusterId,
    pub paths: ClusterPaths,
    pub master_hosts: Vec<Host>,
    pub slave_hosts: Vec<Host>,
    pub ports: PortAssignment,
    pub properties: PropertiesDocument,
}

impl ClusterContext {
    /// Derive role sets and ports from a properties document
    pub fn from_properties(
        cluster_id: ClusterId,
        paths: ClusterPaths,
        properties: PropertiesDocument,
    ) -> DeployResult<Self> {
        let master_hosts = properties.get_hosts(keys::MASTER_HOSTS);
        if master_hosts.is_empty() {
            return Err(DeployError::Validation(format!(
                "cluster {}: '{}' is missing or empty",
                cluster_id,
                keys::MASTER_HOSTS
            )));
        }
        let ports = PortAssignment::from_properties(&properties)?;
        let slave_hosts = if ports.slaves_enabled() {
            let hosts = properties.get_hosts(keys::SLAVE_HOSTS);
            if hosts.is_empty() {
                master_hosts.clone()
            } else {
                hosts
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            cluster_id,
            paths,
            master_hosts,
            slave_hosts,
            ports,
            properties,
        })
    }

    pub fn master_nodes(&self) -> Vec<NodeAddr> {
        NodeAddr::product(&self.master_hosts, self.ports.master().iter())
    }

    pub fn slave_nodes(&self) -> Vec<NodeAddr> {
        NodeAddr::product(&self.slave_hosts, self.ports.slave().iter())
    }

    pub fn all_nodes(&self) -> Vec<NodeAddr> {
        let mut nodes = self.master_nodes();
        nodes.extend(self.slave_nodes());
        nodes
    }

    /// Every host in either role set, first-seen order
    pub fn all_hosts(&self) -> Vec<Host> {
        let mut hosts = self.master_hosts.clone();
        for host in &self.slave_hosts {
            if !hosts.contains(host) {
                hosts.push(host.clone());
            }
        }
        hosts
    }

    pub fn slaves_enabled(&self) -> bool {
        self.ports.slaves_enabled()
    }

    /// Ports of every node process running on `host`, in either role
    pub fn ports_on(&self, host: &Host) -> PortSet {
        let mut ports = PortSet::new();
        if self.master_hosts.contains(host) {
            ports = ports.union(self.ports.master());
        }
        if self.slave_hosts.contains(host) {
            ports = ports.union(self.ports.slave());
        }
        ports
    }
}
