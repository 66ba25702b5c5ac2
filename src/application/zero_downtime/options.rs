//! Zero-Downtime Options

use std::path::PathBuf;

use crate::domain::entities::BackupTag;
use crate::domain::value_objects::ClusterId;

#[derive(Debug, Clone)]
pub struct ZeroDowntimeOptions {
    pub cluster_id: ClusterId,
    /// Local installer artifact shipped to the master hosts
    pub installer: PathBuf,
    /// Snapshot tag; a UTC timestamp when unset
    pub tag: Option<BackupTag>,
}

impl ZeroDowntimeOptions {
    pub fn new(cluster_id: ClusterId, installer: impl Into<PathBuf>) -> Self {
        Self {
            cluster_id,
            installer: installer.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: BackupTag) -> Self {
        self.tag = Some(tag);
        self
    }
}
