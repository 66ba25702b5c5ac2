//! Snapshot Results

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::entities::BackupTag;
use crate::domain::value_objects::{ClusterId, DeployState, Host};

#[derive(Debug, Clone, Serialize)]
pub struct BackupOutcome {
    pub tag: BackupTag,
    pub conf_backup: PathBuf,
    pub data_backups: Vec<(Host, PathBuf)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    pub tag: BackupTag,
    /// Restored files, relative to the conf directory
    pub files: Vec<PathBuf>,
    pub synced: Vec<Host>,
}

/// Deploy state of a cluster on the local machine and on its hosts
#[derive(Debug, Clone, Serialize)]
pub struct StateReport {
    pub cluster_id: ClusterId,
    pub local: DeployState,
    /// Empty unless the cluster is deployed locally
    pub hosts: Vec<(Host, DeployState)>,
}
