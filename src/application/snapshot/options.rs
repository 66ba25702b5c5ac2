//! Snapshot Options

use crate::domain::entities::BackupTag;
use crate::domain::value_objects::ClusterId;

#[derive(Debug, Clone)]
pub struct BackupOptions {
    pub cluster_id: ClusterId,
    /// Archive tag; a UTC timestamp when unset
    pub tag: Option<BackupTag>,
    /// Also archive the cluster directory on every host
    pub include_data: bool,
}

impl BackupOptions {
    pub fn new(cluster_id: ClusterId) -> Self {
        Self {
            cluster_id,
            tag: None,
            include_data: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestoreOptions {
    pub cluster_id: ClusterId,
    pub tag: BackupTag,
    /// Push the restored conf to every remote host
    pub sync: bool,
}
